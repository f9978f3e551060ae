use pdf_tools::{cli, status::Tool};
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::parse_args::<cli::PdfToWordArgs>(Tool::PdfToWord) {
        Ok(args) => cli::pdf_to_word(args),
        Err(code) => code,
    }
}
