//! An immutable in-memory index over the administrative-division dataset.
//!
//! Built once at startup into hash maps keyed by code, name, suffix-stripped
//! name stem, pinyin, alias and parent code, giving O(1) lookups for every
//! strategy the matcher runs. There is no mutation API; the index is safe for
//! unsynchronized concurrent reads behind an `Arc`.

use crate::types::division::AdministrativeUnit;
use std::collections::HashMap;

/// Administrative suffixes stripped when deriving a name stem, longest first
/// so that "自治区" is not cut down to "区".
const NAME_SUFFIXES: &[&str] = &[
    "特别行政区",
    "自治区",
    "自治州",
    "自治县",
    "街道",
    "省",
    "市",
    "区",
    "县",
    "镇",
    "乡",
    "村",
    "旗",
    "盟",
];

/// Suffixes marking a town/village-level sub-unit, used by the matcher's
/// parent fallback.
const SUBUNIT_SUFFIXES: &[&str] = &["街道", "镇", "乡", "村"];

/// Returns the name with one trailing administrative suffix removed, or
/// `None` when no suffix applies or stripping would leave fewer than two
/// characters ("沙市" must not become "沙").
pub(crate) fn name_stem(name: &str) -> Option<String> {
    for suffix in NAME_SUFFIXES {
        if let Some(stem) = name.strip_suffix(suffix) {
            if stem.chars().count() >= 2 {
                return Some(stem.to_string());
            }
        }
    }
    None
}

/// Whether the text ends in a town/village-level suffix.
pub(crate) fn has_subunit_suffix(text: &str) -> bool {
    SUBUNIT_SUFFIXES.iter().any(|s| text.ends_with(s))
}

/// Normalizes a pinyin or ascii query: lowercase, apostrophes and spaces
/// removed ("Lin'an" and "linan" index identically).
pub(crate) fn normalize_pinyin(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\'' | '’' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone)]
pub struct DivisionIndex {
    units: Vec<AdministrativeUnit>,
    by_code: HashMap<String, usize>,
    by_name: HashMap<String, Vec<usize>>,
    by_stem: HashMap<String, Vec<usize>>,
    by_pinyin: HashMap<String, Vec<usize>>,
    by_alias: HashMap<String, Vec<usize>>,
    children: HashMap<String, Vec<usize>>,
}

impl DivisionIndex {
    pub fn new(units: Vec<AdministrativeUnit>) -> Self {
        let mut by_code = HashMap::with_capacity(units.len());
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::with_capacity(units.len());
        let mut by_stem: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_pinyin: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_alias: HashMap<String, Vec<usize>> = HashMap::new();
        let mut children: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, unit) in units.iter().enumerate() {
            by_code.insert(unit.code.clone(), idx);
            by_name.entry(unit.name.clone()).or_default().push(idx);
            if let Some(stem) = name_stem(&unit.name) {
                by_stem.entry(stem).or_default().push(idx);
            }
            if !unit.pinyin.is_empty() {
                by_pinyin
                    .entry(normalize_pinyin(&unit.pinyin))
                    .or_default()
                    .push(idx);
            }
            for alias in &unit.aliases {
                by_alias.entry(alias.clone()).or_default().push(idx);
            }
            if let Some(parent) = &unit.parent_code {
                children.entry(parent.clone()).or_default().push(idx);
            }
        }

        Self {
            units,
            by_code,
            by_name,
            by_stem,
            by_pinyin,
            by_alias,
            children,
        }
    }

    pub fn get(&self, code: &str) -> Option<&AdministrativeUnit> {
        self.by_code.get(code).map(|&idx| &self.units[idx])
    }

    /// Units whose official name equals `name`.
    pub fn lookup_exact(&self, name: &str) -> Vec<&AdministrativeUnit> {
        self.resolve_indices(self.by_name.get(name))
    }

    /// Units whose suffix-stripped name equals `stem`.
    pub fn lookup_stem(&self, stem: &str) -> Vec<&AdministrativeUnit> {
        self.resolve_indices(self.by_stem.get(stem))
    }

    /// Units whose normalized pinyin equals `pinyin`.
    pub fn lookup_by_pinyin(&self, pinyin: &str) -> Vec<&AdministrativeUnit> {
        self.resolve_indices(self.by_pinyin.get(&normalize_pinyin(pinyin)))
    }

    /// Units carrying `alias` in their alias table.
    pub fn lookup_alias(&self, alias: &str) -> Vec<&AdministrativeUnit> {
        self.resolve_indices(self.by_alias.get(alias))
    }

    /// Direct children of the unit with `parent_code`.
    pub fn lookup_children(&self, parent_code: &str) -> Vec<&AdministrativeUnit> {
        self.resolve_indices(self.children.get(parent_code))
    }

    /// All units in the subtree rooted at `parent_code`, excluding the root.
    pub fn descendants(&self, parent_code: &str) -> Vec<&AdministrativeUnit> {
        let mut found = Vec::new();
        let mut stack = vec![parent_code.to_string()];
        while let Some(code) = stack.pop() {
            if let Some(child_indices) = self.children.get(&code) {
                for &idx in child_indices {
                    let unit = &self.units[idx];
                    stack.push(unit.code.clone());
                    found.push(unit);
                }
            }
        }
        found
    }

    pub fn units(&self) -> &[AdministrativeUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn resolve_indices(&self, indices: Option<&Vec<usize>>) -> Vec<&AdministrativeUnit> {
        indices
            .map(|v| v.iter().map(|&idx| &self.units[idx]).collect())
            .unwrap_or_default()
    }
}
