use pdf_tools::{cli, status::Tool};
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::parse_args::<cli::SplitArgs>(Tool::Splitter) {
        Ok(args) => cli::pdf_splitter(args),
        Err(code) => code,
    }
}
