pub mod python;
pub mod types;

use anyhow::Result;

pub use python::PythonEngine;
pub use types::{ConvertIn, ConvertOut};

/// The PDF to DOCX collaborator. Implementations own the document format
/// work; callers only see success, failure and the runner's message.
pub trait Converter {
    fn convert(&self, req: &ConvertIn) -> Result<ConvertOut>;
}
