//! Platform format profiles and detection.
//!
//! Every layout decision in the crate is a pure function of a record's own
//! contents and one [`FormatProfile`]. Profiles are constants in a fixed
//! registry; [`detect_format`] picks one from raw bytes.

mod detect;
mod profile;

pub use detect::detect_format;
pub use profile::{FormatProfile, LayoutFeature, Platform, Region, SIZE_OF_GAME_IN_BYTES};
