//! The closed catalog palette pieces can be recoloured to.
//!
//! Names must match the server's catalog exactly; they are sent verbatim as
//! `new_color` in recolour requests.

use crate::Rgb;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogColor {
    Maroon,
    Red,
    Orange,
    Yellow,
    Olive,
    Purple,
    Fuchsia,
    White,
    Lime,
    Green,
    Navy,
    Blue,
    Aqua,
    Teal,
    Black,
    Silver,
}

impl CatalogColor {
    /// Catalog order, as the server lists it.
    pub const ALL: [CatalogColor; 16] = [
        CatalogColor::Maroon,
        CatalogColor::Red,
        CatalogColor::Orange,
        CatalogColor::Yellow,
        CatalogColor::Olive,
        CatalogColor::Purple,
        CatalogColor::Fuchsia,
        CatalogColor::White,
        CatalogColor::Lime,
        CatalogColor::Green,
        CatalogColor::Navy,
        CatalogColor::Blue,
        CatalogColor::Aqua,
        CatalogColor::Teal,
        CatalogColor::Black,
        CatalogColor::Silver,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CatalogColor::Maroon => "maroon",
            CatalogColor::Red => "red",
            CatalogColor::Orange => "orange",
            CatalogColor::Yellow => "yellow",
            CatalogColor::Olive => "olive",
            CatalogColor::Purple => "purple",
            CatalogColor::Fuchsia => "fuchsia",
            CatalogColor::White => "white",
            CatalogColor::Lime => "lime",
            CatalogColor::Green => "green",
            CatalogColor::Navy => "navy",
            CatalogColor::Blue => "blue",
            CatalogColor::Aqua => "aqua",
            CatalogColor::Teal => "teal",
            CatalogColor::Black => "black",
            CatalogColor::Silver => "silver",
        }
    }

    pub fn rgb(self) -> Rgb {
        match self {
            CatalogColor::Maroon => Rgb(128, 0, 0),
            CatalogColor::Red => Rgb(255, 0, 0),
            CatalogColor::Orange => Rgb(255, 165, 0),
            CatalogColor::Yellow => Rgb(255, 255, 0),
            CatalogColor::Olive => Rgb(128, 128, 0),
            CatalogColor::Purple => Rgb(128, 0, 128),
            CatalogColor::Fuchsia => Rgb(255, 0, 255),
            CatalogColor::White => Rgb(255, 255, 255),
            CatalogColor::Lime => Rgb(0, 255, 0),
            CatalogColor::Green => Rgb(0, 128, 0),
            CatalogColor::Navy => Rgb(0, 0, 128),
            CatalogColor::Blue => Rgb(0, 0, 255),
            CatalogColor::Aqua => Rgb(0, 255, 255),
            CatalogColor::Teal => Rgb(0, 128, 128),
            CatalogColor::Black => Rgb(0, 0, 0),
            CatalogColor::Silver => Rgb(192, 192, 192),
        }
    }

    /// Case-insensitive lookup; surrounding whitespace is ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        BY_NAME.get(name.trim().to_ascii_lowercase().as_str()).copied()
    }
}

impl fmt::Display for CatalogColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static BY_NAME: Lazy<HashMap<&'static str, CatalogColor>> =
    Lazy::new(|| CatalogColor::ALL.iter().map(|&c| (c.name(), c)).collect());

/// Comma-separated catalog names, for prompts and error messages.
pub fn palette_hint() -> String {
    CatalogColor::ALL
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}
