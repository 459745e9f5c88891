//! # lcsave-core
//!
//! Binary save-game engine for the Liberty City saves of the 3D-era game.
//!
//! This crate provides:
//! - A bounds-checked byte cursor ([`ByteBuffer`])
//! - Platform format profiles and auto-detection
//! - The [`SaveRecord`] contract and the typed records built on it
//! - Block framing with checksums and padding
//! - Whole-file [`load`] / [`save`] for PC, Xbox, PS2 (NTSC, Australia,
//!   Japan), Android, iOS and the Definitive edition
//!
//! ```no_run
//! let bytes = std::fs::read("GTA3sf1.b")?;
//! let save = lcsave_core::load(&bytes)?;
//! println!("{} on {}", save.simple_vars.save_name, save.profile);
//! let converted = lcsave_core::save(&save, &lcsave_core::FormatProfile::ANDROID)?;
//! # Ok::<(), lcsave_core::Error>(())
//! ```

pub mod block;
pub mod buffer;
pub mod error;
pub mod format;
pub mod record;
pub mod save;

pub use block::{BlockFramer, BlockLayout, Section};
pub use buffer::{ByteBuffer, Date, FixedLayout, StringEncoding, SystemTime, Vector3};
pub use error::{Error, Result};
pub use format::{
    FormatProfile, LayoutFeature, Platform, Region, SIZE_OF_GAME_IN_BYTES, detect_format,
};
pub use record::{
    CarGenerator, CarGeneratorData, Garage, GarageData, GarageState, GarageType, PedType,
    PedTypeData, PlayerInfo, RawSection, RunningScript, SaveRecord, ScriptData, SimpleVariables,
    StoredCar, StoredCarFlags,
};
pub use save::{
    LoadOptions, SaveFile, SaveOptions, SaveSummary, SectionSummary, load, load_with, save,
    save_with,
};
