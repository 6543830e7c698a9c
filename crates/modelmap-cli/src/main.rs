use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modelmap_core::options::parse_key_value;
use modelmap_core::sink::{relative_path, DirCodeGenerator, MemoryCodeGenerator};
use modelmap_core::{parse_manifest_json, process, GenerateOptions, ManifestResolver, RunReport};

#[derive(Parser, Debug)]
#[command(name = "modelmap")]
#[command(
    about = "Generates mapping functions between data class declarations.",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate mapper functions from a declaration manifest.
    Generate {
        #[arg(long)]
        r#in: PathBuf,
        /// Source root directory (writes <out>/<package path>/<file-name>.kt).
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        package: Option<String>,
        #[arg(long)]
        file_name: Option<String>,
        /// Print `*` in place of every generic argument.
        #[arg(long, default_value_t = false)]
        erase_generics: bool,
        /// Processor option, e.g. `-O ignoreGenericArgs=true`. Repeatable.
        #[arg(short = 'O', long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,
        /// If set, fail if output differs; do not write.
        #[arg(long, default_value_t = false)]
        check: bool,
        /// Write the run report as JSON to this path.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the diagnostics catalog as markdown.
    Diagnostics,
}

fn main() -> Result<()> {
    init_tracing();
    try_main().map_err(|err| {
        eprintln!("{err:#}");
        err
    })
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            r#in,
            out,
            package,
            file_name,
            erase_generics,
            options,
            check,
            report,
        } => {
            let opts = build_options(
                &options,
                package.as_deref(),
                file_name.as_deref(),
                erase_generics,
            )?;
            run_generate(&r#in, &out, &opts, check, report.as_deref())
        }
        Command::Diagnostics => {
            print!("{}", modelmap_core::diagnostics::render_diagnostics_md());
            Ok(())
        }
    }
}

fn build_options(
    raw: &[String],
    package: Option<&str>,
    file_name: Option<&str>,
    erase_generics: bool,
) -> Result<GenerateOptions> {
    let mut opts = GenerateOptions::default();
    let pairs = raw
        .iter()
        .map(|s| parse_key_value(s))
        .collect::<Result<Vec<_>, _>>()?;
    opts.apply_processor_options(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

    if let Some(package) = package {
        opts.set_package(package)?;
    }
    if let Some(file_name) = file_name {
        opts.set_file_name(file_name)?;
    }
    if erase_generics {
        opts.erase_generics = true;
    }
    Ok(opts)
}

fn run_generate(
    manifest_path: &Path,
    out_root: &Path,
    opts: &GenerateOptions,
    check: bool,
    report_path: Option<&Path>,
) -> Result<()> {
    let bytes = std::fs::read(manifest_path)
        .with_context(|| format!("read manifest: {}", manifest_path.display()))?;
    let decls = match parse_manifest_json(&bytes) {
        Ok(decls) => decls,
        Err(err) => {
            eprintln!("{}", err.to_diagnostic(&manifest_path.display().to_string()));
            anyhow::bail!("parse manifest JSON: {}", manifest_path.display());
        }
    };

    let report = if check {
        let mut cg = MemoryCodeGenerator::new();
        let report = process(&decls, &ManifestResolver, &mut cg, opts)?;
        let generated = cg.file(&opts.package, &opts.file_name);
        check_output(out_root, opts, generated.as_deref())?;
        report
    } else {
        let mut cg = DirCodeGenerator::new(out_root);
        process(&decls, &ManifestResolver, &mut cg, opts)?
    };
    let report = report.with_source_digest(&bytes);

    if let Some(path) = report_path {
        write_report(path, &report)?;
    }

    for d in &report.diagnostics {
        eprintln!("{d}");
    }
    if !report.ok() {
        anyhow::bail!(
            "{} mapping(s) skipped; see diagnostics above",
            report.diagnostics.len()
        );
    }
    Ok(())
}

/// Compares a check run with what is on disk. `generated` is `None` when the run
/// produced no file, in which case a leftover file is stale.
fn check_output(out_root: &Path, opts: &GenerateOptions, generated: Option<&str>) -> Result<()> {
    let out_path = out_root.join(relative_path(&opts.package, &opts.file_name));
    let Some(generated) = generated else {
        if out_path.exists() {
            anyhow::bail!(
                "stale generated output (no mappers remain): {}",
                out_path.display()
            );
        }
        return Ok(());
    };
    let cur = std::fs::read_to_string(&out_path)
        .with_context(|| format!("read existing output: {}", out_path.display()))?;
    if cur != generated {
        anyhow::bail!("generated output differs: {}", out_path.display());
    }
    Ok(())
}

fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let mut json = serde_json::to_string_pretty(report).context("encode run report")?;
    json.push('\n');
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create report dir: {}", parent.display()))?;
    }
    std::fs::write(path, json.as_bytes())
        .with_context(|| format!("write report: {}", path.display()))?;
    Ok(())
}
