//! CLI command implementations.

mod config;
mod convert;
mod deps;
mod download;

pub use config::run_config;
pub use convert::run_convert;
pub use deps::run_deps;
pub use download::run_download;
