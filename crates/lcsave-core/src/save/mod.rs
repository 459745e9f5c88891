//! Whole-file load and save.

mod controller;
mod file;
mod options;
pub mod signature;
mod summary;

pub use controller::{load, load_with, save, save_with};
pub use file::SaveFile;
pub use options::{LoadOptions, LoadOptionsBuilder, SaveOptions, SaveOptionsBuilder};
pub use summary::{SaveSummary, SectionSummary};

/// Bytes of the trailing Xbox signature
pub const SIGNATURE_LEN: usize = 20;
