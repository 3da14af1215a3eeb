//! Data structures for administrative divisions: the units of the static
//! reference dataset and the geographic coordinate type attached to them.

use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are represented as `f64`.
///
/// # Examples
///
/// ```
/// use tianqi::LatLon;
///
/// let hangzhou = LatLon(30.2741, 120.1551);
/// assert_eq!(hangzhou.0, 30.2741); // Latitude
/// assert_eq!(hangzhou.1, 120.1551); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

/// The level of an administrative division in the national hierarchy.
///
/// Ordering follows specificity: `Province < City < County < Town`, so a
/// `Town` is the most specific level. County-level districts of a city
/// (市辖区) are represented as [`DivisionLevel::County`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivisionLevel {
    Province,
    City,
    County,
    Town,
}

impl DivisionLevel {
    /// Numeric specificity rank, higher means more specific.
    pub fn specificity(&self) -> u8 {
        match self {
            DivisionLevel::Province => 0,
            DivisionLevel::City => 1,
            DivisionLevel::County => 2,
            DivisionLevel::Town => 3,
        }
    }
}

/// A single administrative division from the reference dataset.
///
/// Units form a strict tree: every non-root unit has exactly one parent,
/// identified by [`AdministrativeUnit::parent_code`]. The full set is loaded
/// once at startup and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdministrativeUnit {
    /// The national statistics code of the division (e.g. "330110").
    pub code: String,
    /// The official name, including its administrative suffix (e.g. "余杭区").
    pub name: String,
    /// Code of the parent division, `None` for province-level roots.
    pub parent_code: Option<String>,
    /// Hierarchy level of this unit.
    pub level: DivisionLevel,
    /// Representative coordinate (usually the seat of government).
    pub coordinate: LatLon,
    /// Lowercase pinyin of the name without tone marks (e.g. "yuhang").
    pub pinyin: String,
    /// Alternative names the division is commonly known by.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Resident population, when the dataset provides it. Used only to break
    /// ties between equally confident matches.
    #[serde(default)]
    pub population: Option<u64>,
}
