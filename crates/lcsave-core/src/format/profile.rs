use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Logical payload size every platform pads its save to, checksum included
pub const SIZE_OF_GAME_IN_BYTES: usize = 0x31400;

/// Working buffer size on PC-derived builds
const WORK_BUFFER_SIZE: usize = 55000;
/// Working buffer size on PS2 builds
const PS2_WORK_BUFFER_SIZE: usize = 50000;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
pub enum Platform {
    #[strum(serialize = "PC")]
    Pc,
    #[strum(serialize = "Xbox")]
    Xbox,
    #[strum(serialize = "PS2")]
    Ps2,
    #[strum(serialize = "Android")]
    Android,
    #[strum(serialize = "iOS")]
    Ios,
    #[strum(serialize = "Definitive")]
    Definitive,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    EnumString,
    IntoStaticStr,
    Display,
)]
pub enum Region {
    #[default]
    #[strum(serialize = "default")]
    Default,
    #[strum(serialize = "Australia")]
    Australia,
    #[strum(serialize = "Japan")]
    Japan,
}

/// Optional or variable-width pieces of the layout.
///
/// This is the single table saying which platform stores what; records ask
/// [`FormatProfile::has`] instead of testing platform flags themselves.
///
/// | feature                | present on                         |
/// |------------------------|------------------------------------|
/// | `SaveHeader`           | everything except PS2              |
/// | `PadMode`              | everything except Android/iOS      |
/// | `Ps2Preferences`       | PS2                                |
/// | `BloodSetting`         | PS2 except Australia               |
/// | `LanguageSetting`      | PS2 except Japan                   |
/// | `BigEndianSizeMagic`   | PS2 Japan                          |
/// | `DefinitiveExtras`     | Definitive                         |
/// | `PointerFiller`        | everything except PS2              |
/// | `ShortModelIndex`      | iOS                                |
/// | `CompactPackageCounts` | Android, iOS                       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Display)]
pub enum LayoutFeature {
    /// Wide-char save name and SYSTEMTIME at the start of the simple variables
    SaveHeader,
    /// Controller pad mode word in the simple variables
    PadMode,
    /// Menu preferences stored inside the simple variables
    Ps2Preferences,
    BloodSetting,
    LanguageSetting,
    /// The "size of game" constant is stored byte-swapped
    BigEndianSizeMagic,
    DefinitiveExtras,
    /// 4-byte engine handles written back verbatim
    PointerFiller,
    /// Garage target model stored as u16 instead of u32
    ShortModelIndex,
    /// Package counters stored as i16 instead of i32
    CompactPackageCounts,
}

/// One platform/release layout variant.
///
/// Immutable; the supported set is [`FormatProfile::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FormatProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub platform: Platform,
    pub region: Region,
    pub max_garages: usize,
    pub max_stored_cars: usize,
    pub max_car_generators: usize,
    /// Gosub return stack slots per running script
    pub stack_depth: usize,
    pub working_buffer_capacity: usize,
    /// Total file size before any platform signature
    pub target_size: usize,
}

impl FormatProfile {
    const BASE: Self = Self {
        id: "",
        name: "",
        platform: Platform::Pc,
        region: Region::Default,
        max_garages: 32,
        max_stored_cars: 18,
        max_car_generators: 160,
        stack_depth: 6,
        working_buffer_capacity: WORK_BUFFER_SIZE,
        target_size: SIZE_OF_GAME_IN_BYTES,
    };

    const PS2_BASE: Self = Self {
        platform: Platform::Ps2,
        max_garages: 28,
        max_car_generators: 128,
        working_buffer_capacity: PS2_WORK_BUFFER_SIZE,
        ..Self::BASE
    };

    pub const PC: Self = Self {
        id: "pc",
        name: "PC",
        ..Self::BASE
    };

    pub const XBOX: Self = Self {
        id: "xbox",
        name: "Xbox",
        platform: Platform::Xbox,
        ..Self::BASE
    };

    pub const PS2: Self = Self {
        id: "ps2",
        name: "PS2 (NTSC)",
        ..Self::PS2_BASE
    };

    pub const PS2_AU: Self = Self {
        id: "ps2-au",
        name: "PS2 (PAL Australia)",
        region: Region::Australia,
        ..Self::PS2_BASE
    };

    pub const PS2_JP: Self = Self {
        id: "ps2-jp",
        name: "PS2 (Japan)",
        region: Region::Japan,
        ..Self::PS2_BASE
    };

    pub const ANDROID: Self = Self {
        id: "android",
        name: "Android",
        platform: Platform::Android,
        stack_depth: 16,
        ..Self::BASE
    };

    pub const IOS: Self = Self {
        id: "ios",
        name: "iOS",
        platform: Platform::Ios,
        stack_depth: 16,
        ..Self::BASE
    };

    pub const DEFINITIVE: Self = Self {
        id: "definitive",
        name: "Definitive Edition",
        platform: Platform::Definitive,
        stack_depth: 16,
        ..Self::BASE
    };

    pub const ALL: [Self; 8] = [
        Self::PC,
        Self::XBOX,
        Self::PS2,
        Self::PS2_AU,
        Self::PS2_JP,
        Self::ANDROID,
        Self::IOS,
        Self::DEFINITIVE,
    ];

    /// Look up a registry profile by id (case-insensitive)
    pub fn by_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.id.eq_ignore_ascii_case(id))
    }

    pub fn is_pc(&self) -> bool {
        self.platform == Platform::Pc
    }

    pub fn is_ps2(&self) -> bool {
        self.platform == Platform::Ps2
    }

    pub fn is_xbox(&self) -> bool {
        self.platform == Platform::Xbox
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self.platform, Platform::Android | Platform::Ios)
    }

    pub fn is_ios(&self) -> bool {
        self.platform == Platform::Ios
    }

    pub fn is_remaster(&self) -> bool {
        self.platform == Platform::Definitive
    }

    pub fn is_japan(&self) -> bool {
        self.region == Region::Japan
    }

    pub fn is_australia(&self) -> bool {
        self.region == Region::Australia
    }

    /// Bytes appended after the checksum
    pub fn signature_len(&self) -> usize {
        if self.is_xbox() {
            crate::save::SIGNATURE_LEN
        } else {
            0
        }
    }

    pub fn has(&self, feature: LayoutFeature) -> bool {
        match feature {
            LayoutFeature::SaveHeader | LayoutFeature::PointerFiller => !self.is_ps2(),
            LayoutFeature::PadMode => !self.is_mobile(),
            LayoutFeature::Ps2Preferences => self.is_ps2(),
            LayoutFeature::BloodSetting => self.is_ps2() && !self.is_australia(),
            LayoutFeature::LanguageSetting => self.is_ps2() && !self.is_japan(),
            LayoutFeature::BigEndianSizeMagic => self.is_japan(),
            LayoutFeature::DefinitiveExtras => self.is_remaster(),
            LayoutFeature::ShortModelIndex => self.is_ios(),
            LayoutFeature::CompactPackageCounts => self.is_mobile(),
        }
    }
}

impl std::fmt::Display for FormatProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;

    #[test]
    fn test_registry_ids_are_unique() {
        let ids: HashSet<_> = FormatProfile::ALL.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), FormatProfile::ALL.len());
    }

    #[test]
    fn test_by_id() {
        assert_eq!(FormatProfile::by_id("PS2-JP"), Some(FormatProfile::PS2_JP));
        assert_eq!(FormatProfile::by_id("gamecube"), None);
    }

    #[test]
    fn test_family_predicates() {
        assert!(FormatProfile::PS2_AU.is_ps2());
        assert!(FormatProfile::PS2_AU.is_australia());
        assert!(!FormatProfile::PS2_AU.is_japan());
        assert!(FormatProfile::IOS.is_mobile());
        assert!(FormatProfile::ANDROID.is_mobile());
        assert!(!FormatProfile::PC.is_mobile());
        assert!(FormatProfile::DEFINITIVE.is_remaster());
        assert!(FormatProfile::XBOX.is_xbox());
    }

    #[test]
    fn test_layout_features() {
        assert!(FormatProfile::PC.has(LayoutFeature::SaveHeader));
        assert!(!FormatProfile::PS2.has(LayoutFeature::SaveHeader));
        assert!(FormatProfile::PS2.has(LayoutFeature::BloodSetting));
        assert!(!FormatProfile::PS2_AU.has(LayoutFeature::BloodSetting));
        assert!(!FormatProfile::PS2_JP.has(LayoutFeature::LanguageSetting));
        assert!(FormatProfile::PS2_JP.has(LayoutFeature::BigEndianSizeMagic));
        assert!(FormatProfile::IOS.has(LayoutFeature::ShortModelIndex));
        assert!(!FormatProfile::ANDROID.has(LayoutFeature::ShortModelIndex));
        assert!(!FormatProfile::ANDROID.has(LayoutFeature::PadMode));
    }

    #[test]
    fn test_signature_only_on_xbox() {
        assert_eq!(FormatProfile::XBOX.signature_len(), 20);
        for profile in FormatProfile::ALL.iter().filter(|p| !p.is_xbox()) {
            assert_eq!(profile.signature_len(), 0, "{}", profile);
        }
    }

    #[test]
    fn test_platform_names() {
        assert_eq!(Platform::from_str("iOS").unwrap(), Platform::Ios);
        assert_eq!(Platform::Ps2.to_string(), "PS2");
    }
}
