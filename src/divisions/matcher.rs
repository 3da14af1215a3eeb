//! Resolves free-text place queries to administrative divisions.
//!
//! Strategies run in order of decreasing confidence: exact name, hierarchical
//! decomposition of compound queries, alias and pinyin lookups, fuzzy edit
//! distance, and finally a parent fallback for unresolved sub-units. Every
//! strategy contributes confidence-weighted candidates; the highest-scored
//! candidate wins, ties broken by the more specific administrative level and
//! then by larger population.

use crate::divisions::error::ResolveError;
use crate::divisions::index::{has_subunit_suffix, name_stem, DivisionIndex};
use crate::types::division::AdministrativeUnit;
use crate::types::location::{LocationInfo, MatchStrategy};
use log::debug;
use ordered_float::OrderedFloat;
use std::sync::Arc;

const EXACT_CONFIDENCE: f64 = 1.0;
/// Confidence when the query or the division name matched in stem form.
const STEM_CONFIDENCE: f64 = 0.95;
/// Per-segment factor for a stem match inside a decomposed query.
const STEM_FACTOR: f64 = 0.95;
const ALIAS_CONFIDENCE: f64 = 0.85;
const PINYIN_CONFIDENCE: f64 = 0.8;
/// Fuzzy confidence is the similarity scaled by this weight, so a fuzzy hit
/// can never outrank an exact or hierarchical one.
const FUZZY_WEIGHT: f64 = 0.85;
const FUZZY_SIMILARITY_FLOOR: f64 = 0.8;
/// A parent fallback halves the parent's confidence.
const FALLBACK_PENALTY: f64 = 0.5;
const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;
/// With a candidate at or above this score the fuzzy scan is skipped.
const STRONG_CONFIDENCE: f64 = 0.9;

struct Candidate<'a> {
    unit: &'a AdministrativeUnit,
    confidence: f64,
    strategy: MatchStrategy,
    approximate: bool,
}

/// Resolves free-text queries against a [`DivisionIndex`].
#[derive(Debug, Clone)]
pub struct PlaceMatcher {
    index: Arc<DivisionIndex>,
    min_confidence: f64,
}

impl PlaceMatcher {
    pub fn new(index: Arc<DivisionIndex>) -> Self {
        Self {
            index,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    /// Overrides the confidence floor below which a query is `PlaceNotFound`.
    pub fn with_min_confidence(index: Arc<DivisionIndex>, min_confidence: f64) -> Self {
        Self {
            index,
            min_confidence,
        }
    }

    /// Resolves `query` to the best-matching division.
    ///
    /// Returns [`ResolveError::PlaceNotFound`] only when no candidate at any
    /// level, including the parent fallback, reaches the confidence floor.
    pub fn resolve(&self, query: &str) -> Result<LocationInfo, ResolveError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(ResolveError::PlaceNotFound {
                query: query.to_string(),
            });
        }

        let mut candidates: Vec<Candidate<'_>> = Vec::new();
        self.collect_exact(trimmed, &mut candidates);
        self.collect_hierarchical(trimmed, &mut candidates);
        self.collect_alias(trimmed, &mut candidates);
        self.collect_pinyin(trimmed, &mut candidates);

        // The fuzzy scan walks the whole dataset; only pay for it when the
        // cheap strategies came up short.
        if !candidates
            .iter()
            .any(|c| c.confidence >= STRONG_CONFIDENCE)
        {
            self.collect_fuzzy(trimmed, &mut candidates);
        }

        let best = candidates.into_iter().max_by_key(|c| {
            (
                OrderedFloat(c.confidence),
                c.unit.level.specificity(),
                c.unit.population.unwrap_or(0),
            )
        });

        match best {
            Some(c) if c.confidence >= self.min_confidence => {
                debug!(
                    "resolved '{}' to {} ({}) via {:?} at {:.2}",
                    trimmed, c.unit.name, c.unit.code, c.strategy, c.confidence
                );
                Ok(LocationInfo {
                    unit: c.unit.clone(),
                    confidence: c.confidence,
                    strategy: c.strategy,
                    approximate: c.approximate,
                })
            }
            _ => Err(ResolveError::PlaceNotFound {
                query: trimmed.to_string(),
            }),
        }
    }

    fn collect_exact<'s>(&'s self, query: &str, out: &mut Vec<Candidate<'s>>) {
        for unit in self.index.lookup_exact(query) {
            out.push(Candidate {
                unit,
                confidence: EXACT_CONFIDENCE,
                strategy: MatchStrategy::Exact,
                approximate: false,
            });
        }
        // The query is the stem of a division name ("杭州" for "杭州市").
        for unit in self.index.lookup_stem(query) {
            out.push(Candidate {
                unit,
                confidence: STEM_CONFIDENCE,
                strategy: MatchStrategy::Exact,
                approximate: false,
            });
        }
        // The query carries a different suffix than the dataset name
        // ("临安市" vs "临安区"): compare stem against stem.
        if let Some(query_stem) = name_stem(query) {
            for unit in self.index.lookup_exact(&query_stem) {
                out.push(Candidate {
                    unit,
                    confidence: STEM_CONFIDENCE,
                    strategy: MatchStrategy::Exact,
                    approximate: false,
                });
            }
            for unit in self.index.lookup_stem(&query_stem) {
                if unit.name != query {
                    out.push(Candidate {
                        unit,
                        confidence: STEM_CONFIDENCE * STEM_FACTOR,
                        strategy: MatchStrategy::Exact,
                        approximate: false,
                    });
                }
            }
        }
    }

    /// Greedy decomposition of compound queries ("杭州市余杭区"): the longest
    /// known prefix becomes the scope, and the remainder is resolved within
    /// that scope's descendants. A remainder with a town/village suffix that
    /// stays unresolved falls back to the scope itself, flagged approximate.
    fn collect_hierarchical<'s>(&'s self, query: &str, out: &mut Vec<Candidate<'s>>) {
        let chars: Vec<char> = query.chars().collect();
        if chars.len() < 3 {
            return;
        }
        for split in (2..chars.len()).rev() {
            let prefix: String = chars[..split].iter().collect();
            let remainder: String = chars[split..].iter().collect();

            let mut scopes: Vec<(&AdministrativeUnit, f64)> = self
                .index
                .lookup_exact(&prefix)
                .into_iter()
                .map(|u| (u, EXACT_CONFIDENCE))
                .collect();
            if scopes.is_empty() {
                scopes = self
                    .index
                    .lookup_stem(&prefix)
                    .into_iter()
                    .map(|u| (u, STEM_CONFIDENCE))
                    .collect();
            }
            if scopes.is_empty() {
                continue;
            }

            let before = out.len();
            for (scope, scope_confidence) in scopes {
                match self.resolve_scoped(scope, &remainder) {
                    Some((unit, factor)) => out.push(Candidate {
                        unit,
                        confidence: scope_confidence * factor,
                        strategy: MatchStrategy::Hierarchical,
                        approximate: false,
                    }),
                    None if has_subunit_suffix(&remainder) => {
                        debug!(
                            "'{}' not found under {}; falling back to the parent",
                            remainder, scope.name
                        );
                        out.push(Candidate {
                            unit: scope,
                            confidence: (scope_confidence * FALLBACK_PENALTY)
                                .max(self.min_confidence),
                            strategy: MatchStrategy::ParentFallback,
                            approximate: true,
                        });
                    }
                    None => {}
                }
            }
            if out.len() > before {
                // Longest known prefix wins; shorter splits would only
                // produce weaker readings of the same query.
                break;
            }
        }
    }

    /// Resolves `rest` within the subtree of `scope`, returning the match and
    /// a confidence factor (1.0 for an exact segment chain, scaled down by
    /// [`STEM_FACTOR`] per stem-form segment).
    fn resolve_scoped<'s>(
        &'s self,
        scope: &AdministrativeUnit,
        rest: &str,
    ) -> Option<(&'s AdministrativeUnit, f64)> {
        let descendants = self.index.descendants(&scope.code);

        for &unit in &descendants {
            if unit.name == rest {
                return Some((unit, 1.0));
            }
        }

        let rest_stem = name_stem(rest);
        for &unit in &descendants {
            let unit_stem = name_stem(&unit.name);
            let stem_hit = unit_stem.as_deref() == Some(rest)
                || rest_stem.as_deref() == Some(unit.name.as_str())
                || (unit_stem.is_some() && unit_stem == rest_stem);
            if stem_hit {
                return Some((unit, STEM_FACTOR));
            }
        }

        // Multi-segment remainder: peel off the longest matching descendant
        // prefix and recurse into it.
        let chars: Vec<char> = rest.chars().collect();
        if chars.len() > 2 {
            for split in (2..chars.len()).rev() {
                let prefix: String = chars[..split].iter().collect();
                let remainder: String = chars[split..].iter().collect();
                for &unit in &descendants {
                    let factor = if unit.name == prefix {
                        1.0
                    } else if name_stem(&unit.name).as_deref() == Some(prefix.as_str()) {
                        STEM_FACTOR
                    } else {
                        continue;
                    };
                    if let Some((found, inner)) = self.resolve_scoped(unit, &remainder) {
                        return Some((found, factor * inner));
                    }
                }
            }
        }
        None
    }

    fn collect_alias<'s>(&'s self, query: &str, out: &mut Vec<Candidate<'s>>) {
        for unit in self.index.lookup_alias(query) {
            out.push(Candidate {
                unit,
                confidence: ALIAS_CONFIDENCE,
                strategy: MatchStrategy::Alias,
                approximate: false,
            });
        }
    }

    fn collect_pinyin<'s>(&'s self, query: &str, out: &mut Vec<Candidate<'s>>) {
        if !query.is_ascii() {
            return;
        }
        for unit in self.index.lookup_by_pinyin(query) {
            out.push(Candidate {
                unit,
                confidence: PINYIN_CONFIDENCE,
                strategy: MatchStrategy::Pinyin,
                approximate: false,
            });
        }
    }

    fn collect_fuzzy<'s>(&'s self, query: &str, out: &mut Vec<Candidate<'s>>) {
        let query_stem = name_stem(query);
        for unit in self.index.units() {
            let mut similarity = strsim::normalized_levenshtein(query, &unit.name);
            if let (Some(qs), Some(us)) = (&query_stem, name_stem(&unit.name)) {
                similarity = similarity.max(strsim::normalized_levenshtein(qs, &us));
            }
            if similarity >= FUZZY_SIMILARITY_FLOOR {
                out.push(Candidate {
                    unit,
                    confidence: similarity * FUZZY_WEIGHT,
                    strategy: MatchStrategy::Fuzzy,
                    approximate: false,
                });
            }
        }
    }
}
