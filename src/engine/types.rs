use serde::{Deserialize, Serialize};

/// Request sent to the conversion runner on stdin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertIn {
    pub input_pdf: String,
    pub output_docx: String,
    /// 0-based first page.
    pub start: u32,
    /// Exclusive end page; `None` converts to the last page.
    pub end: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOut {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl ConvertOut {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
            warnings: Vec::new(),
            meta: serde_json::Value::Null,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
            warnings: Vec::new(),
            meta: serde_json::Value::Null,
        }
    }
}
