pub mod cli;
pub mod config;
pub mod convert;
pub mod document;
pub mod engine;
pub mod error;
pub mod page_range;
pub mod split;
pub mod status;
pub mod util;
