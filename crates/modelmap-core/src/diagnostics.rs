use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Parse,
    Resolve,
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticCode {
    MM0001ManifestParseError,
    MM0100OriginNotARecord,
    MM0101TargetNotARecord,
    MM0110UnresolvableField,
    MM0120DuplicateField,
    MM0130UnknownDeclaration,
    MM0140InvalidName,
}

impl DiagnosticCode {
    pub fn code_str(self) -> &'static str {
        match self {
            DiagnosticCode::MM0001ManifestParseError => "MM0001",
            DiagnosticCode::MM0100OriginNotARecord => "MM0100",
            DiagnosticCode::MM0101TargetNotARecord => "MM0101",
            DiagnosticCode::MM0110UnresolvableField => "MM0110",
            DiagnosticCode::MM0120DuplicateField => "MM0120",
            DiagnosticCode::MM0130UnknownDeclaration => "MM0130",
            DiagnosticCode::MM0140InvalidName => "MM0140",
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            DiagnosticCode::MM0001ManifestParseError => "failed to parse declaration manifest",
            DiagnosticCode::MM0100OriginNotARecord => "origin type must be a data class",
            DiagnosticCode::MM0101TargetNotARecord => "target type must be a data class",
            DiagnosticCode::MM0110UnresolvableField => "field type could not be resolved",
            DiagnosticCode::MM0120DuplicateField => "duplicate field name",
            DiagnosticCode::MM0130UnknownDeclaration => "mapper target declaration not found",
            DiagnosticCode::MM0140InvalidName => {
                "declaration or field name is not an identifier"
            }
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            DiagnosticCode::MM0001ManifestParseError => Phase::Parse,
            DiagnosticCode::MM0110UnresolvableField | DiagnosticCode::MM0130UnknownDeclaration => {
                Phase::Resolve
            }
            _ => Phase::Validate,
        }
    }

    pub fn default_help(self) -> Option<&'static str> {
        match self {
            DiagnosticCode::MM0100OriginNotARecord | DiagnosticCode::MM0101TargetNotARecord => {
                Some("Only non-generic `data class` declarations can take part in a mapping.")
            }
            DiagnosticCode::MM0130UnknownDeclaration => {
                Some("Include the target declaration in the manifest passed to modelmap.")
            }
            DiagnosticCode::MM0140InvalidName => {
                Some("Use letters, digits and '_', not starting with a digit.")
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub phase: Phase,
    pub severity: Severity,
    /// Qualified name of the offending declaration.
    pub subject: String,
    pub message: String,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(
        code: DiagnosticCode,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            code,
            phase: code.phase(),
            severity: Severity::Error,
            subject: subject.into(),
            message: message.into(),
            help: code.default_help().map(|s| s.to_string()),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {:?} [{}]: {}",
            self.code.code_str(),
            self.phase,
            self.severity,
            self.subject,
            self.message
        )?;
        if let Some(help) = &self.help {
            write!(f, "\n  help: {help}")?;
        }
        Ok(())
    }
}

pub fn render_diagnostics_md() -> String {
    let mut rows: Vec<(&'static str, Phase, &'static str, &'static str)> = all_codes()
        .iter()
        .map(|code| {
            (
                code.code_str(),
                code.phase(),
                code.default_message(),
                code.default_help().unwrap_or(""),
            )
        })
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    out.push_str("# modelmap diagnostics catalog\n\n");
    out.push_str("This document is generated from `crates/modelmap-core/src/diagnostics.rs`.\n\n");
    out.push_str("| Code | Phase | Severity | Message | Help |\n");
    out.push_str("| ---- | ----- | -------- | ------- | ---- |\n");
    for (code, phase, msg, help) in rows {
        out.push_str(&format!(
            "| {code} | {phase:?} | {:?} | {msg} | {help} |\n",
            Severity::Error
        ));
    }
    out
}

fn all_codes() -> &'static [DiagnosticCode] {
    &[
        DiagnosticCode::MM0001ManifestParseError,
        DiagnosticCode::MM0100OriginNotARecord,
        DiagnosticCode::MM0101TargetNotARecord,
        DiagnosticCode::MM0110UnresolvableField,
        DiagnosticCode::MM0120DuplicateField,
        DiagnosticCode::MM0130UnknownDeclaration,
        DiagnosticCode::MM0140InvalidName,
    ]
}
