use crate::{
    config::Config,
    document::PdfDocument,
    error::ToolError,
    page_range::{PageRange, RangeSpec},
    util::ensure_dir,
};
use anyhow::{Context, Result, anyhow};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    All,
    Range(RangeSpec),
}

impl SplitMode {
    pub fn name(&self) -> &'static str {
        match self {
            SplitMode::All => "all",
            SplitMode::Range(_) => "range",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SplitRequest {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub mode: SplitMode,
}

impl SplitRequest {
    /// Validates mode and range syntax. Nothing on disk is touched.
    pub fn from_args(
        input_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        mode: &str,
        range: Option<&str>,
    ) -> Result<Self, ToolError> {
        let mode = match mode {
            "all" => {
                if let Some(r) = range {
                    warn!("range '{r}' ignored in mode 'all'");
                }
                SplitMode::All
            }
            "range" => {
                let raw = range.ok_or_else(|| ToolError::InvalidRange {
                    spec: String::new(),
                    reason: "mode 'range' needs a range argument".into(),
                })?;
                let spec = RangeSpec::parse(raw)
                    .inspect_err(|err| warn!(?err, "rejecting range argument"))?;
                SplitMode::Range(spec)
            }
            other => return Err(ToolError::UnknownMode(other.to_string())),
        };
        Ok(Self {
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            mode,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SplitReport {
    pub total_pages: u32,
    pub outputs: Vec<PathBuf>,
}

pub fn page_file_name(page: u32) -> String {
    format!("page_{page}.pdf")
}

pub fn extracted_file_name(range: PageRange) -> String {
    format!("extracted_{}-{}.pdf", range.start_page, range.end_page)
}

/// Runs a validated request. The `DEBUG:` progress line goes to `out`, which
/// is stdout for the CLI.
pub fn split_pdf(cfg: &Config, req: &SplitRequest, out: &mut dyn Write) -> Result<SplitReport> {
    let doc = PdfDocument::open(&req.input_path)?;
    let total_pages = doc.page_count();

    ensure_dir(&req.output_dir)?;

    writeln!(
        out,
        "DEBUG: Processing {} pages in mode '{}'",
        total_pages,
        req.mode.name()
    )
    .with_context(|| "write progress line")?;

    let compress = cfg.split.compress_output;
    let outputs = match req.mode {
        SplitMode::All => split_all(&doc, &req.output_dir, compress)?,
        SplitMode::Range(spec) => {
            let range = spec.normalize(total_pages).ok_or_else(|| {
                anyhow!(
                    "cannot extract a range from {}: document has no pages",
                    doc.path().display()
                )
            })?;
            let dest = req.output_dir.join(extracted_file_name(range));
            doc.write_range(range, &dest, compress)?;
            vec![dest]
        }
    };

    info!(
        total_pages,
        files = outputs.len(),
        "split {} into {}",
        req.input_path.display(),
        req.output_dir.display()
    );

    Ok(SplitReport {
        total_pages,
        outputs,
    })
}

fn split_all(doc: &PdfDocument, output_dir: &Path, compress: bool) -> Result<Vec<PathBuf>> {
    let mut outputs = Vec::with_capacity(doc.page_count() as usize);
    for page in 1..=doc.page_count() {
        let dest = output_dir.join(page_file_name(page));
        doc.write_range(PageRange::single(page), &dest, compress)?;
        outputs.push(dest);
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_one_based_and_unpadded() {
        assert_eq!(page_file_name(1), "page_1.pdf");
        assert_eq!(page_file_name(12), "page_12.pdf");
        let range = PageRange {
            start_page: 3,
            end_page: 7,
        };
        assert_eq!(extracted_file_name(range), "extracted_3-7.pdf");
    }

    #[test]
    fn range_mode_requires_a_range() {
        let err = SplitRequest::from_args("in.pdf", "out", "range", None).unwrap_err();
        assert!(matches!(err, ToolError::InvalidRange { .. }));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = SplitRequest::from_args("in.pdf", "out", "odd", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown mode 'odd' (expected 'all' or 'range')"
        );
    }

    #[test]
    fn all_mode_ignores_range() {
        let req = SplitRequest::from_args("in.pdf", "out", "all", Some("2-3")).unwrap();
        assert_eq!(req.mode, SplitMode::All);
    }
}
