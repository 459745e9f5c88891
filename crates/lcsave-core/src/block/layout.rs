use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};

use crate::format::FormatProfile;

/// Top-level save sections in file order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, IntoStaticStr, Display,
)]
pub enum Section {
    SimpleVars,
    Scripts,
    PedPool,
    Garages,
    Vehicles,
    Objects,
    Paths,
    Cranes,
    Pickups,
    PhoneInfo,
    Restarts,
    RadarBlips,
    Zones,
    Gangs,
    CarGenerators,
    Particles,
    AudioObjects,
    PlayerInfo,
    Stats,
    Streaming,
    PedTypes,
}

impl Section {
    /// Inner block tag, for the sections framed with one
    pub fn tag(self) -> Option<&'static str> {
        match self {
            Section::Scripts => Some("SCR"),
            Section::Restarts => Some("RST"),
            Section::RadarBlips => Some("RDR"),
            Section::Zones => Some("ZNS"),
            Section::Gangs => Some("GNG"),
            Section::CarGenerators => Some("CGN"),
            Section::AudioObjects => Some("AUD"),
            Section::PedTypes => Some("PTP"),
            _ => None,
        }
    }

    /// The simple variables sit unframed at the start of outer block 0
    pub fn is_framed(self) -> bool {
        self != Section::SimpleVars
    }
}

use Section::*;

const SPLIT_BLOCKS: &[&[Section]] = &[
    &[SimpleVars, Scripts],
    &[PedPool],
    &[Garages],
    &[Vehicles],
    &[Objects],
    &[Paths],
    &[Cranes],
    &[Pickups],
    &[PhoneInfo],
    &[Restarts],
    &[RadarBlips],
    &[Zones],
    &[Gangs],
    &[CarGenerators],
    &[Particles],
    &[AudioObjects],
    &[PlayerInfo],
    &[Stats],
    &[Streaming],
    &[PedTypes],
];

const PS2_BLOCKS: &[&[Section]] = &[
    &[SimpleVars, Scripts, PedPool, Garages, Vehicles],
    &[Objects, Paths, Cranes],
    &[Pickups, PhoneInfo, Restarts, RadarBlips],
    &[
        Zones,
        Gangs,
        CarGenerators,
        Particles,
        AudioObjects,
        PlayerInfo,
        Stats,
        Streaming,
        PedTypes,
    ],
];

/// Fixed assignment of sections to outer blocks.
///
/// Load and save walk the same table; which section lands in which outer
/// block is part of the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    blocks: &'static [&'static [Section]],
}

impl BlockLayout {
    pub fn for_profile(profile: &FormatProfile) -> Self {
        let blocks = if profile.is_ps2() {
            PS2_BLOCKS
        } else {
            SPLIT_BLOCKS
        };
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Outer blocks with their index
    pub fn blocks(&self) -> impl Iterator<Item = (usize, &'static [Section])> + '_ {
        self.blocks.iter().copied().enumerate()
    }

    /// Index of the outer block holding `section`
    pub fn block_of(&self, section: Section) -> Option<usize> {
        self.blocks
            .iter()
            .position(|sections| sections.contains(&section))
    }
}
