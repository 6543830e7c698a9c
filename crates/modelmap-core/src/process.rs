use std::io::{self, Write};

use modelmap_contracts::{GENERATED_BY, RUN_REPORT_SCHEMA_VERSION};
use serde::Serialize;

use crate::decl::{DeclarationSet, MappingCandidate};
use crate::diagnostics::{Diagnostic, Severity};
use crate::emit::{emit_function, write_file_header, write_function};
use crate::matcher::match_fields;
use crate::options::GenerateOptions;
use crate::resolve::TypeResolver;
use crate::schema::MappingSpec;
use crate::sink::{relative_path, CodeGenerator};
use crate::validate::{validate, Role, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("cannot create output file {path}: {source}")]
    SinkUnavailable {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot write output file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub package: String,
    pub file_name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedFunction {
    pub origin: String,
    pub target: String,
    pub name: String,
}

/// Outcome of one run: what was written and what was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub schema_version: String,
    pub generated_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_sha256: Option<String>,
    /// `None` when nothing was marked and no file was created.
    pub output: Option<OutputFile>,
    pub functions: Vec<EmittedFunction>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    fn new(output: Option<OutputFile>) -> Self {
        RunReport {
            schema_version: RUN_REPORT_SCHEMA_VERSION.to_string(),
            generated_by: GENERATED_BY.to_string(),
            source_sha256: None,
            output,
            functions: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_source_digest(mut self, source: &[u8]) -> Self {
        self.source_sha256 = Some(crate::util::sha256_hex(source));
        self
    }

    pub fn ok(&self) -> bool {
        self.diagnostics
            .iter()
            .all(|d| d.severity != Severity::Error)
    }
}

/// Runs one generation pass over every marked declaration in `decls`.
///
/// Invalid mappings are reported in the returned report and skipped. Only a sink
/// that cannot be opened or written fails the whole run.
pub fn process<R, G>(
    decls: &DeclarationSet,
    resolver: &R,
    codegen: &mut G,
    opts: &GenerateOptions,
) -> Result<RunReport, RunError>
where
    R: TypeResolver + ?Sized,
    G: CodeGenerator,
{
    let candidates = decls.mapping_candidates();
    if candidates.is_empty() {
        tracing::info!("no mapper markers found; nothing to generate");
        return Ok(RunReport::new(None));
    }

    let path = relative_path(&opts.package, &opts.file_name)
        .to_string_lossy()
        .into_owned();
    let mut sink = codegen
        .create_new_file(&opts.package, &opts.file_name)
        .map_err(|source| RunError::SinkUnavailable {
            path: path.clone(),
            source,
        })?;
    let write_err = |source: io::Error| RunError::Write {
        path: path.clone(),
        source,
    };

    let mut report = RunReport::new(Some(OutputFile {
        package: opts.package.clone(),
        file_name: opts.file_name.clone(),
        path: path.clone(),
    }));

    sink.write_all(write_file_header(&opts.package).as_bytes())
        .map_err(write_err)?;

    let render_opts = opts.render_options();
    for candidate in candidates {
        let spec = match prepare_spec(decls, candidate, resolver) {
            Ok(spec) => spec,
            Err(diag) => {
                tracing::error!(
                    subject = %diag.subject,
                    code = diag.code.code_str(),
                    "{}",
                    diag.message
                );
                report.diagnostics.push(diag);
                continue;
            }
        };

        let decisions = match_fields(&spec.origin, &spec.target);
        let function = emit_function(&spec, &decisions, render_opts);
        sink.write_all(write_function(&function).as_bytes())
            .map_err(write_err)?;

        tracing::debug!(
            origin = %spec.origin.qualified_name,
            target = %spec.target.qualified_name,
            params = function.parameters.len(),
            "emitted {}",
            function.name
        );
        report.functions.push(EmittedFunction {
            origin: spec.origin.qualified_name,
            target: spec.target.qualified_name,
            name: function.name,
        });
    }

    sink.flush().map_err(write_err)?;

    tracing::info!(
        path = %path,
        functions = report.functions.len(),
        skipped = report.diagnostics.len(),
        "generation finished"
    );
    Ok(report)
}

fn prepare_spec<R: TypeResolver + ?Sized>(
    decls: &DeclarationSet,
    candidate: MappingCandidate<'_>,
    resolver: &R,
) -> Result<MappingSpec, Diagnostic> {
    let origin = validate(candidate.origin, resolver).map_err(|e| e.to_diagnostic(Role::Origin))?;

    let target_decl = decls.get(candidate.target).ok_or_else(|| {
        ValidationError::UnknownDeclaration {
            qualified_name: candidate.target.to_string(),
        }
        .to_diagnostic(Role::Target)
    })?;
    let target = validate(target_decl, resolver).map_err(|e| e.to_diagnostic(Role::Target))?;

    Ok(MappingSpec { origin, target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{Declaration, DeclarationKind, MapperMarker, PropertyDecl, TypeExpr};
    use crate::diagnostics::DiagnosticCode;
    use crate::resolve::ManifestResolver;
    use crate::sink::MemoryCodeGenerator;

    fn data_class(name: &str, props: &[(&str, &str)], targets: &[&str]) -> Declaration {
        Declaration {
            qualified_name: name.to_string(),
            simple_name: None,
            kind: DeclarationKind::Class,
            modifiers: vec!["data".to_string()],
            type_params: Vec::new(),
            properties: props
                .iter()
                .map(|(n, t)| PropertyDecl {
                    name: n.to_string(),
                    ty: Some(TypeExpr {
                        name: t.to_string(),
                        args: Vec::new(),
                        nullable: false,
                    }),
                    receiver: None,
                    computed: false,
                })
                .collect(),
            mappers: targets
                .iter()
                .map(|t| MapperMarker {
                    target: t.to_string(),
                })
                .collect(),
        }
    }

    struct Unavailable;

    impl CodeGenerator for Unavailable {
        type Sink = Vec<u8>;

        fn create_new_file(&mut self, _package: &str, _file_name: &str) -> io::Result<Vec<u8>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    /// Accepts the header, then fails every later write.
    struct FailingSink {
        header_written: bool,
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.header_written {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "disk full"));
            }
            self.header_written = true;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct DiskFull;

    impl CodeGenerator for DiskFull {
        type Sink = FailingSink;

        fn create_new_file(
            &mut self,
            _package: &str,
            _file_name: &str,
        ) -> io::Result<FailingSink> {
            Ok(FailingSink {
                header_written: false,
            })
        }
    }

    #[test]
    fn failed_function_write_is_fatal() {
        let decls = DeclarationSet::new(vec![
            data_class("ron.A", &[("x", "kotlin.Int")], &["ron.B"]),
            data_class("ron.B", &[("x", "kotlin.Int")], &[]),
        ]);
        let err = process(
            &decls,
            &ManifestResolver,
            &mut DiskFull,
            &GenerateOptions::default(),
        )
        .expect_err("must fail");
        match &err {
            RunError::Write { path, source } => {
                assert_eq!(path, "ron/GeneratedMapperFunctions.kt");
                assert_eq!(source.kind(), io::ErrorKind::WriteZero);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn no_markers_creates_no_file() {
        let decls = DeclarationSet::new(vec![data_class("ron.A", &[], &[])]);
        let mut cg = MemoryCodeGenerator::new();
        let report =
            process(&decls, &ManifestResolver, &mut cg, &GenerateOptions::default()).expect("run");
        assert!(report.output.is_none());
        assert!(cg.paths().is_empty());
        assert!(report.ok());
    }

    #[test]
    fn unknown_target_is_one_diagnostic() {
        let decls = DeclarationSet::new(vec![data_class(
            "ron.A",
            &[("x", "kotlin.Int")],
            &["ron.Missing"],
        )]);
        let mut cg = MemoryCodeGenerator::new();
        let report =
            process(&decls, &ManifestResolver, &mut cg, &GenerateOptions::default()).expect("run");
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(
            report.diagnostics[0].code,
            DiagnosticCode::MM0130UnknownDeclaration
        );
        assert_eq!(report.diagnostics[0].subject, "ron.Missing");
        assert!(!report.ok());
        assert_eq!(
            cg.file("ron", "GeneratedMapperFunctions").as_deref(),
            Some("package ron\n\n")
        );
    }

    #[test]
    fn unavailable_sink_is_fatal() {
        let decls = DeclarationSet::new(vec![
            data_class("ron.A", &[("x", "kotlin.Int")], &["ron.B"]),
            data_class("ron.B", &[("x", "kotlin.Int")], &[]),
        ]);
        let err = process(
            &decls,
            &ManifestResolver,
            &mut Unavailable,
            &GenerateOptions::default(),
        )
        .expect_err("must fail");
        assert!(matches!(err, RunError::SinkUnavailable { .. }));
        assert!(err.to_string().contains("ron/GeneratedMapperFunctions.kt"));
    }

    #[test]
    fn report_digest_is_hex_sha256() {
        let report = RunReport::new(None).with_source_digest(b"abc");
        assert_eq!(
            report.source_sha256.as_deref(),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }
}
