//! Facility records shown on the map and quoted by the assistant.
//!
//! Records are loaded once at startup and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// What kind of facility a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Composting facilities and community compost sites.
    Composting,
    /// Recycling centers and drop-off facilities.
    Recycling,
    /// Education centers running sustainability workshops.
    Workshop,
    /// Community gardens and urban farms.
    Garden,
}

impl Category {
    /// Lowercase name as it appears in the dataset.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Composting => "composting",
            Self::Recycling => "recycling",
            Self::Workshop => "workshop",
            Self::Garden => "garden",
        }
    }

    /// All categories, in map legend order.
    #[must_use]
    pub fn all() -> &'static [Category] {
        &[Self::Composting, Self::Recycling, Self::Workshop, Self::Garden]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "composting" => Ok(Self::Composting),
            "recycling" => Ok(Self::Recycling),
            "workshop" => Ok(Self::Workshop),
            "garden" => Ok(Self::Garden),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// WGS84 position, serialised as a `[latitude, longitude]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
}

impl Coordinates {
    /// Create a coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.latitude, c.longitude]
    }
}

// ---------------------------------------------------------------------------
// LocationRecord
// ---------------------------------------------------------------------------

/// One facility on the sustainability map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Stable unique identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Free-form facility type, e.g. "Composting Facility".
    #[serde(rename = "type")]
    pub kind: String,
    /// Map category.
    pub category: Category,
    /// Map position.
    pub coordinates: Coordinates,
    /// Street address.
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Accepted materials (composting and recycling sites).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<String>>,
    /// Workshops offered (education centers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workshops: Option<Vec<String>>,
    /// Produce grown (gardens and farms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produce: Option<Vec<String>>,
    pub description: String,
}

impl LocationRecord {
    /// Accepted materials, or an empty slice when the record lists none.
    #[must_use]
    pub fn materials(&self) -> &[String] {
        self.materials.as_deref().unwrap_or_default()
    }

    /// One-line postal address: `street, city, state zip`.
    #[must_use]
    pub fn full_address(&self) -> String {
        format!("{}, {}, {} {}", self.address, self.city, self.state, self.zip)
    }
}
