use pdf_tools::{cli, status::Tool};
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::parse_args::<cli::GuardedPdfToWordArgs>(Tool::GuardedPdfToWord) {
        Ok(args) => cli::pdf_to_word_guarded(args),
        Err(code) => code,
    }
}
