//! The per-query result of place resolution.

use crate::types::division::AdministrativeUnit;

/// Which matching strategy produced a [`LocationInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// The query equalled a division name (or its suffix-stripped stem).
    Exact,
    /// The query was decomposed into a known prefix plus a remainder resolved
    /// within that prefix's descendants.
    Hierarchical,
    /// The query matched an entry of the alias table.
    Alias,
    /// The query matched the pinyin spelling of a division name.
    Pinyin,
    /// The query was close to a division name under normalized edit distance.
    Fuzzy,
    /// An unresolved sub-unit fell back to its resolved parent division.
    ParentFallback,
}

/// A resolved location: the matched division plus match provenance.
///
/// Created per query and never persisted. `approximate` is `true` when
/// resolution fell back to a parent unit because the queried sub-unit is not
/// in the dataset.
#[derive(Debug, Clone)]
pub struct LocationInfo {
    pub unit: AdministrativeUnit,
    /// Normalized estimate in `[0, 1]` of how reliable the match is.
    pub confidence: f64,
    pub strategy: MatchStrategy,
    pub approximate: bool,
}
