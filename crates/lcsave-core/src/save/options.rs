use crate::format::FormatProfile;
use crate::save::signature::PLACEHOLDER_SIGNATURE_KEY;

/// Options for [`crate::load_with`]
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Skip detection and parse with this profile
    pub profile: Option<FormatProfile>,
    /// Fail when the stored checksum disagrees with the contents
    pub verify_checksum: bool,
    /// Recompute the Xbox signature and warn when it differs
    pub verify_signature: bool,
    pub signature_key: [u8; 16],
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            profile: None,
            verify_checksum: true,
            verify_signature: true,
            signature_key: PLACEHOLDER_SIGNATURE_KEY,
        }
    }
}

impl LoadOptions {
    pub fn builder() -> LoadOptionsBuilder {
        LoadOptionsBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptionsBuilder {
    profile: Option<FormatProfile>,
    verify_checksum: Option<bool>,
    verify_signature: Option<bool>,
    signature_key: Option<[u8; 16]>,
}

impl LoadOptionsBuilder {
    /// Force a profile instead of detecting one
    pub fn profile(mut self, profile: FormatProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn verify_checksum(mut self, enabled: bool) -> Self {
        self.verify_checksum = Some(enabled);
        self
    }

    pub fn verify_signature(mut self, enabled: bool) -> Self {
        self.verify_signature = Some(enabled);
        self
    }

    pub fn signature_key(mut self, key: [u8; 16]) -> Self {
        self.signature_key = Some(key);
        self
    }

    pub fn build(self) -> LoadOptions {
        let default = LoadOptions::default();
        LoadOptions {
            profile: self.profile.or(default.profile),
            verify_checksum: self.verify_checksum.unwrap_or(default.verify_checksum),
            verify_signature: self.verify_signature.unwrap_or(default.verify_signature),
            signature_key: self.signature_key.unwrap_or(default.signature_key),
        }
    }
}

/// Options for [`crate::save_with`]
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Key for the Xbox HMAC signature
    pub signature_key: [u8; 16],
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            signature_key: PLACEHOLDER_SIGNATURE_KEY,
        }
    }
}

impl SaveOptions {
    pub fn builder() -> SaveOptionsBuilder {
        SaveOptionsBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SaveOptionsBuilder {
    signature_key: Option<[u8; 16]>,
}

impl SaveOptionsBuilder {
    pub fn signature_key(mut self, key: [u8; 16]) -> Self {
        self.signature_key = Some(key);
        self
    }

    pub fn build(self) -> SaveOptions {
        SaveOptions {
            signature_key: self
                .signature_key
                .unwrap_or(SaveOptions::default().signature_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let options = LoadOptions::builder().build();
        assert!(options.profile.is_none());
        assert!(options.verify_checksum);
        assert!(options.verify_signature);
        assert_eq!(options.signature_key, PLACEHOLDER_SIGNATURE_KEY);
    }

    #[test]
    fn test_load_builder_overrides() {
        let options = LoadOptions::builder()
            .profile(FormatProfile::IOS)
            .verify_checksum(false)
            .signature_key([1; 16])
            .build();
        assert_eq!(options.profile, Some(FormatProfile::IOS));
        assert!(!options.verify_checksum);
        assert!(options.verify_signature);
        assert_eq!(options.signature_key, [1; 16]);
    }

    #[test]
    fn test_save_builder() {
        assert_eq!(SaveOptions::builder().build().signature_key, PLACEHOLDER_SIGNATURE_KEY);
        assert_eq!(
            SaveOptions::builder().signature_key([7; 16]).build().signature_key,
            [7; 16]
        );
    }
}
