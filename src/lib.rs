// Library surface for the CLI and integration tests.
// Aggregation and scoring are pure; I/O stays in `store`, `config` and `export`.
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod dashboard;
mod data;
pub mod dosha;
pub mod error;
pub mod export;
pub mod quiz;
pub mod session;
pub mod store;
pub mod util;

pub use error::{JournalError, Result};
