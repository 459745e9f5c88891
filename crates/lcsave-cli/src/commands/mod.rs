//! CLI command implementations.

pub mod detect;
pub mod hex_utils;
pub mod hexdump;
pub mod info;
pub mod profiles;
pub mod resave;

use anyhow::{Result, bail};
use lcsave_core::{FormatProfile, LoadOptions};

/// Resolve a profile id given on the command line
pub fn resolve_profile(id: &str) -> Result<FormatProfile> {
    match FormatProfile::by_id(id) {
        Some(profile) => Ok(profile),
        None => {
            let known: Vec<&str> = FormatProfile::ALL.iter().map(|p| p.id).collect();
            bail!("Unknown profile '{}' (expected one of: {})", id, known.join(", "))
        }
    }
}

pub fn load_options(profile: Option<&str>, ignore_checksum: bool) -> Result<LoadOptions> {
    let mut builder = LoadOptions::builder().verify_checksum(!ignore_checksum);
    if let Some(id) = profile {
        builder = builder.profile(resolve_profile(id)?);
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_profile() {
        assert_eq!(resolve_profile("ps2-au").unwrap(), FormatProfile::PS2_AU);
        let err = resolve_profile("dreamcast").unwrap_err().to_string();
        assert!(err.contains("dreamcast"));
        assert!(err.contains("android"));
    }

    #[test]
    fn test_load_options() {
        let options = load_options(Some("ios"), true).unwrap();
        assert_eq!(options.profile, Some(FormatProfile::IOS));
        assert!(!options.verify_checksum);
        assert!(load_options(None, false).unwrap().profile.is_none());
    }
}
