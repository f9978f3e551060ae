use crate::{
    config::Config,
    convert::{self, ConversionRequest},
    engine::PythonEngine,
    split::{self, SplitRequest},
    status::{Outcome, Tool},
    util::ensure_parent_dir,
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, error::ErrorKind};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(clap::Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Path to config TOML. If omitted, uses ./pdf-tools.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error). Logs go to stderr.
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Parser, Debug)]
#[command(name = "pdf-to-word")]
#[command(about = "Convert a PDF to a Word document")]
pub struct PdfToWordArgs {
    pub input_pdf: PathBuf,
    pub output_docx: PathBuf,
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser, Debug)]
#[command(name = "pdf-to-word-with-ocr-guard")]
#[command(about = "Convert a PDF to a Word document, refusing long documents")]
pub struct GuardedPdfToWordArgs {
    pub input_pdf: PathBuf,
    pub output_docx: PathBuf,
    /// Largest page count that will be converted.
    #[arg(long)]
    pub max_pages: Option<u32>,
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser, Debug)]
#[command(name = "pdf-splitter")]
#[command(about = "Split a PDF into single pages or extract a page range")]
pub struct SplitArgs {
    pub input_pdf: PathBuf,
    pub output_dir: PathBuf,
    /// `all` or `range`.
    pub mode: String,
    /// Page range for `range` mode, e.g. "3-7" or "4".
    #[arg(allow_hyphen_values = true)]
    pub range: Option<String>,
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Parses the process arguments. On failure clap's message is printed and
/// the caller gets the exit code to end with: 0 for `--help`/`--version`,
/// the tool's usage code otherwise.
pub fn parse_args<P: Parser>(tool: Tool) -> Result<P, ExitCode> {
    P::try_parse().map_err(|err| {
        let _ = err.print();
        ExitCode::from(usage_exit_code(tool, err.kind()))
    })
}

fn usage_exit_code(tool: Tool, kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => tool.usage_exit_code(),
    }
}

pub fn pdf_to_word(args: PdfToWordArgs) -> ExitCode {
    run_tool(Tool::PdfToWord, &args.common, |cfg, _out| {
        let req = ConversionRequest::new(&args.input_pdf, &args.output_docx);
        convert::convert_to_word(cfg, &req, || PythonEngine::new(cfg))
    })
}

pub fn pdf_to_word_guarded(args: GuardedPdfToWordArgs) -> ExitCode {
    run_tool(Tool::GuardedPdfToWord, &args.common, |cfg, _out| {
        let mut cfg = cfg.clone();
        if let Some(n) = args.max_pages {
            cfg.guard.max_pages = n;
        }
        let req = ConversionRequest::new(&args.input_pdf, &args.output_docx);
        convert::convert_to_word_guarded(&cfg, &req, || PythonEngine::new(&cfg))
    })
}

pub fn pdf_splitter(args: SplitArgs) -> ExitCode {
    run_tool(Tool::Splitter, &args.common, |cfg, out| {
        let req = SplitRequest::from_args(
            &args.input_pdf,
            &args.output_dir,
            &args.mode,
            args.range.as_deref(),
        )?;
        let report = split::split_pdf(cfg, &req, out)?;
        debug!(outputs = ?report.outputs, "split outputs");
        Ok(())
    })
}

/// Holds the loaded config and keeps the file log writer alive until the
/// status line has been printed.
struct Session {
    cfg: Config,
    _guard: Option<WorkerGuard>,
}

impl Session {
    fn start(common: &CommonArgs) -> Result<Self> {
        let cfg = Config::resolve(common.config.as_deref())?;
        let guard = init_logging(common, &cfg)?;
        Ok(Self { cfg, _guard: guard })
    }
}

fn run_tool<F>(tool: Tool, common: &CommonArgs, body: F) -> ExitCode
where
    F: FnOnce(&Config, &mut dyn Write) -> Result<()>,
{
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let session = Session::start(common);
    let outcome = match &session {
        Ok(s) => Outcome::from(body(&s.cfg, &mut out)),
        Err(err) => Outcome::from_error(err),
    };

    if let Outcome::Failure(msg) = &outcome {
        warn!(?tool, "{msg}");
    }

    let _ = writeln!(out, "{}", outcome.render(tool));
    let _ = out.flush();

    let default_cfg = Config::default();
    let cfg = session.as_ref().map(|s| &s.cfg).unwrap_or(&default_cfg);
    ExitCode::from(outcome.exit_code(tool, cfg))
}

fn init_logging(common: &CommonArgs, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let filter = match common.log_level.as_deref() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(cfg.logging.level.as_str())),
    };

    // stdout carries the status tokens; everything else goes to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = match resolve_log_path(cfg) {
        Some(path) => {
            ensure_parent_dir(&path)?;
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("open log file: {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file || cfg.logging.file_path.is_empty() {
        return None;
    }
    Some(Path::new(&cfg.logging.file_path).to_path_buf())
}
