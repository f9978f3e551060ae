//! Status tokens: the single stdout line each tool ends with.

use crate::{config::Config, error::ToolError};
use std::fmt;

pub const SUCCESS: &str = "SUCCESS";
pub const PAGE_LIMIT_ERROR: &str = "PAGE_LIMIT_ERROR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    PdfToWord,
    GuardedPdfToWord,
    Splitter,
}

impl Tool {
    /// `pdf-to-word` has always printed `Error:`; callers match on it.
    pub fn error_prefix(self) -> &'static str {
        match self {
            Tool::PdfToWord => "Error:",
            Tool::GuardedPdfToWord | Tool::Splitter => "ERROR:",
        }
    }

    /// Exit code for a command line that does not parse. The guarded
    /// converter has always ended quietly with 0 when arguments are missing.
    pub fn usage_exit_code(self) -> u8 {
        match self {
            Tool::GuardedPdfToWord => 0,
            Tool::PdfToWord | Tool::Splitter => 1,
        }
    }

    pub fn exits_nonzero_on_failure(self, cfg: &Config) -> bool {
        match self {
            Tool::GuardedPdfToWord => cfg.guard.exit_nonzero_on_failure,
            Tool::PdfToWord | Tool::Splitter => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    PageLimitExceeded,
    Failure(String),
}

impl Outcome {
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ToolError>() {
            Some(ToolError::PageLimitExceeded { .. }) => Outcome::PageLimitExceeded,
            Some(tool_err) => Outcome::Failure(tool_err.to_string()),
            None => Outcome::Failure(format!("{err:#}")),
        }
    }

    pub fn render(&self, tool: Tool) -> Rendered<'_> {
        Rendered { outcome: self, tool }
    }

    pub fn exit_code(&self, tool: Tool, cfg: &Config) -> u8 {
        match self {
            Outcome::Success | Outcome::PageLimitExceeded => 0,
            Outcome::Failure(_) if tool.exits_nonzero_on_failure(cfg) => 1,
            Outcome::Failure(_) => 0,
        }
    }
}

impl From<anyhow::Result<()>> for Outcome {
    fn from(res: anyhow::Result<()>) -> Self {
        match res {
            Ok(()) => Outcome::Success,
            Err(err) => Outcome::from_error(&err),
        }
    }
}

pub struct Rendered<'a> {
    outcome: &'a Outcome,
    tool: Tool,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Outcome::Success => f.write_str(SUCCESS),
            Outcome::PageLimitExceeded => f.write_str(PAGE_LIMIT_ERROR),
            Outcome::Failure(msg) => write!(f, "{} {}", self.tool.error_prefix(), msg),
        }
    }
}
