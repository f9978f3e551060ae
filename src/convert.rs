use crate::{
    config::Config,
    document,
    engine::{ConvertIn, Converter},
    error::ToolError,
    util::{ensure_parent_dir, looks_like_url},
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl ConversionRequest {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }

    /// Every page: start at 0, no end bound.
    fn full_document(&self) -> ConvertIn {
        ConvertIn {
            input_pdf: self.input_path.display().to_string(),
            output_docx: self.output_path.display().to_string(),
            start: 0,
            end: None,
        }
    }
}

/// Converts the whole input to DOCX. `converter` is only built once the
/// input is known to exist.
pub fn convert_to_word<C, F>(cfg: &Config, req: &ConversionRequest, converter: F) -> Result<()>
where
    C: Converter,
    F: FnOnce() -> Result<C>,
{
    check_input(cfg, &req.input_path)?;
    run_conversion(req, converter)
}

/// Like [`convert_to_word`], but refuses documents longer than
/// `guard.max_pages` before any conversion work starts.
pub fn convert_to_word_guarded<C, F>(
    cfg: &Config,
    req: &ConversionRequest,
    converter: F,
) -> Result<()>
where
    C: Converter,
    F: FnOnce() -> Result<C>,
{
    check_input(cfg, &req.input_path)?;

    let pages = document::page_count(&req.input_path)?;
    let limit = cfg.guard.max_pages;
    if pages > limit {
        info!(pages, limit, "page guard refused {}", req.input_path.display());
        return Err(ToolError::PageLimitExceeded { pages, limit }.into());
    }

    run_conversion(req, converter)
}

fn check_input(cfg: &Config, input: &Path) -> Result<(), ToolError> {
    let raw = input.display().to_string();
    if cfg.security.reject_url_inputs && looks_like_url(&raw) {
        warn!("URL inputs are disabled: {raw}");
        return Err(ToolError::InputNotFound(input.to_path_buf()));
    }
    if !input.exists() {
        return Err(ToolError::InputNotFound(input.to_path_buf()));
    }
    Ok(())
}

fn run_conversion<C, F>(req: &ConversionRequest, converter: F) -> Result<()>
where
    C: Converter,
    F: FnOnce() -> Result<C>,
{
    let failed = |err: anyhow::Error| ToolError::ConversionFailed(format!("{err:#}"));

    let converter = converter().map_err(failed)?;
    ensure_parent_dir(&req.output_path).map_err(failed)?;

    info!(
        "converting {} -> {}",
        req.input_path.display(),
        req.output_path.display()
    );
    let out = converter.convert(&req.full_document()).map_err(failed)?;

    for w in &out.warnings {
        warn!("converter: {w}");
    }
    if !out.ok {
        let msg = out
            .error
            .unwrap_or_else(|| "conversion failed".to_string());
        return Err(ToolError::ConversionFailed(msg).into());
    }
    if !req.output_path.exists() {
        return Err(ToolError::ConversionFailed(format!(
            "converter reported success but output file not found: {}",
            req.output_path.display()
        ))
        .into());
    }

    info!(meta = %out.meta, "wrote {}", req.output_path.display());
    Ok(())
}
