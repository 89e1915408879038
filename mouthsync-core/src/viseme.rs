//! Viseme categories, mouth-shape assets and the per-language tables between them

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Viseme category codes emitted by the generation backend (ids 0-17)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VisemeCategory {
    /// Rest / neutral
    Rest,
    /// M, B, P
    BilabialMbp,
    /// F, V
    LabiodentalFv,
    /// T, D
    AlveolarTd,
    /// N
    NasalN,
    /// K, G
    VelarKg,
    /// CH, J, SH
    PostalveolarChJSh,
    /// S, Z
    SibilantSz,
    /// TH
    DentalTh,
    /// L
    LateralL,
    /// R
    RhoticR,
    /// W, J glide
    GlideW,
    /// A
    OpenA,
    /// E
    MidE,
    /// I
    CloseI,
    /// O, schwa
    RoundedO,
    /// U
    RoundedU,
    /// Diphthongs
    Diphthong,
}

impl VisemeCategory {
    /// Every category, ordered by backend id
    pub const ALL: [VisemeCategory; 18] = [
        VisemeCategory::Rest,
        VisemeCategory::BilabialMbp,
        VisemeCategory::LabiodentalFv,
        VisemeCategory::AlveolarTd,
        VisemeCategory::NasalN,
        VisemeCategory::VelarKg,
        VisemeCategory::PostalveolarChJSh,
        VisemeCategory::SibilantSz,
        VisemeCategory::DentalTh,
        VisemeCategory::LateralL,
        VisemeCategory::RhoticR,
        VisemeCategory::GlideW,
        VisemeCategory::OpenA,
        VisemeCategory::MidE,
        VisemeCategory::CloseI,
        VisemeCategory::RoundedO,
        VisemeCategory::RoundedU,
        VisemeCategory::Diphthong,
    ];

    /// Converts a backend viseme id, returning `None` for ids outside the known set
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Returns the backend id of this category
    pub fn id(self) -> u32 {
        self as u32
    }
}

/// Mouth images available to the avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum MouthShape {
    /// Closed mouth, shown at rest and whenever nothing better is known
    #[default]
    Neutral,
    Aei,
    Bmp,
    Cdnstxyz,
    ChJSh,
    Ee,
    Fv,
    Gk,
    L,
    O,
    Th,
    U,
    Wq,
}

impl MouthShape {
    pub const ALL: [MouthShape; 13] = [
        MouthShape::Neutral,
        MouthShape::Aei,
        MouthShape::Bmp,
        MouthShape::Cdnstxyz,
        MouthShape::ChJSh,
        MouthShape::Ee,
        MouthShape::Fv,
        MouthShape::Gk,
        MouthShape::L,
        MouthShape::O,
        MouthShape::Th,
        MouthShape::U,
        MouthShape::Wq,
    ];

    /// Stable image key, also the asset file stem for every shape but `Neutral`
    pub fn key(self) -> &'static str {
        match self {
            MouthShape::Neutral => "default",
            MouthShape::Aei => "A.E.I",
            MouthShape::Bmp => "B.M.P",
            MouthShape::Cdnstxyz => "C.D.N.S.T.X.Y.Z",
            MouthShape::ChJSh => "CH.J.SH",
            MouthShape::Ee => "EE",
            MouthShape::Fv => "F.V",
            MouthShape::Gk => "G.K",
            MouthShape::L => "L",
            MouthShape::O => "O",
            MouthShape::Th => "TH",
            MouthShape::U => "U",
            MouthShape::Wq => "W.Q",
        }
    }

    /// Asset file name relative to the image directory
    pub fn file_name(self) -> String {
        match self {
            MouthShape::Neutral => "avatar.png".to_string(),
            other => format!("{}.png", other.key()),
        }
    }
}

impl fmt::Display for MouthShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Transcript language, selecting the mouth mapping table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Vi,
    En,
}

impl Language {
    /// Wire code sent to the backend
    pub fn code(self) -> &'static str {
        match self {
            Language::Vi => "vi",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" => Ok(Language::Vi),
            "en" => Ok(Language::En),
            other => Err(Error::UnknownLanguage(other.to_string())),
        }
    }
}

/// Many-to-one table from viseme category to mouth image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouthMapping {
    language: Language,
    shapes: [MouthShape; 18],
}

const VIETNAMESE: [MouthShape; 18] = [
    MouthShape::Neutral,
    MouthShape::Bmp,
    MouthShape::Fv,
    MouthShape::Cdnstxyz,
    MouthShape::Cdnstxyz,
    MouthShape::Gk,
    MouthShape::ChJSh,
    MouthShape::Cdnstxyz,
    MouthShape::Th,
    MouthShape::L,
    // No dedicated R image
    MouthShape::L,
    MouthShape::Wq,
    MouthShape::Aei,
    MouthShape::Aei,
    MouthShape::Ee,
    MouthShape::O,
    MouthShape::U,
    MouthShape::Aei,
];

const ENGLISH: [MouthShape; 18] = [
    MouthShape::Neutral,
    MouthShape::Bmp,
    MouthShape::Fv,
    MouthShape::Cdnstxyz,
    MouthShape::Cdnstxyz,
    MouthShape::Gk,
    MouthShape::ChJSh,
    MouthShape::Cdnstxyz,
    MouthShape::Th,
    MouthShape::L,
    // English R is lip-rounded
    MouthShape::Wq,
    MouthShape::Wq,
    MouthShape::Aei,
    MouthShape::Aei,
    MouthShape::Ee,
    MouthShape::O,
    MouthShape::U,
    MouthShape::O,
];

impl MouthMapping {
    /// Selects the table for a language
    pub fn for_language(language: Language) -> Self {
        let shapes = match language {
            Language::Vi => VIETNAMESE,
            Language::En => ENGLISH,
        };
        Self { language, shapes }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Mouth shape for a known category
    pub fn shape(&self, category: VisemeCategory) -> MouthShape {
        self.shapes[category as usize]
    }

    /// Mouth shape for a raw backend id, falling back to `MouthShape::Neutral`
    pub fn shape_for_id(&self, id: u32) -> MouthShape {
        VisemeCategory::from_id(id)
            .map(|category| self.shape(category))
            .unwrap_or_default()
    }
}

impl Default for MouthMapping {
    fn default() -> Self {
        Self::for_language(Language::default())
    }
}
