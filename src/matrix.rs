//! # CI Matrix Builder
//!
//! Turns a package's set of buildable `(profile, scheme)` cells into the
//! list of CI job entries that cover them. Each [`MatrixEntry`] stands for
//! every profile in `profiles` crossed with every scheme in `schemes`.
//!
//! ## Grouping
//!
//! Cells are first grouped by profile into `profile -> {scheme}`. Profiles
//! are then folded into entries by a linear scan in profile order: a profile
//! joins the first entry whose scheme set is equal to its own, otherwise it
//! opens a new entry. Profiles whose scheme sets overlap without being equal
//! stay in separate entries; job identifiers downstream depend on this exact
//! grouping.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use serde::Serialize;

use crate::error::Result;

/// A buildable `(profile, scheme)` pair.
pub type Cell = (String, String);

/// Schemes buildable for each profile.
pub type ProfileSchemes = BTreeMap<String, BTreeSet<String>>;

/// One CI job definition: `profiles × schemes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixEntry {
    pub profiles: BTreeSet<String>,
    pub schemes: BTreeSet<String>,
}

impl MatrixEntry {
    /// Number of `(profile, scheme)` jobs the entry expands to.
    pub fn job_count(&self) -> usize {
        self.profiles.len() * self.schemes.len()
    }
}

/// Group cells into `profile -> {scheme}`.
pub fn by_profile<'a, I>(cells: I) -> ProfileSchemes
where
    I: IntoIterator<Item = &'a Cell>,
{
    let mut grouped = ProfileSchemes::new();
    for (profile, scheme) in cells {
        grouped
            .entry(profile.clone())
            .or_default()
            .insert(scheme.clone());
    }
    grouped
}

/// Fold profiles with identical scheme sets into shared entries.
pub fn group(by_profile: &ProfileSchemes) -> Vec<MatrixEntry> {
    let mut entries: Vec<MatrixEntry> = Vec::new();
    for (profile, schemes) in by_profile {
        match entries.iter_mut().find(|entry| &entry.schemes == schemes) {
            Some(entry) => {
                entry.profiles.insert(profile.clone());
            }
            None => entries.push(MatrixEntry {
                profiles: BTreeSet::from([profile.clone()]),
                schemes: schemes.clone(),
            }),
        }
    }
    entries
}

/// Group `cells` straight into matrix entries.
pub fn build<'a, I>(cells: I) -> Vec<MatrixEntry>
where
    I: IntoIterator<Item = &'a Cell>,
{
    group(&by_profile(cells))
}

/// Merge `other` into `into`, unioning scheme sets of shared profiles.
pub fn union_into(into: &mut ProfileSchemes, other: &ProfileSchemes) {
    for (profile, schemes) in other {
        into.entry(profile.clone())
            .or_default()
            .extend(schemes.iter().cloned());
    }
}

/// Restricts cells by profile and scheme patterns.
///
/// Patterns match from the start of the name, so `gcc` selects every
/// `gcc*` profile while `vs2019$` selects only `vs2019`.
#[derive(Debug, Clone, Default)]
pub struct MatrixFilter {
    profile: Option<Regex>,
    scheme: Option<Regex>,
}

impl MatrixFilter {
    pub fn new(profile: Option<&str>, scheme: Option<&str>) -> Result<Self> {
        let compile = |pattern: &str| Regex::new(&format!("^(?:{})", pattern));
        Ok(Self {
            profile: profile.map(compile).transpose()?,
            scheme: scheme.map(compile).transpose()?,
        })
    }

    pub fn matches(&self, profile: &str, scheme: &str) -> bool {
        self.profile.as_ref().is_none_or(|re| re.is_match(profile))
            && self.scheme.as_ref().is_none_or(|re| re.is_match(scheme))
    }

    /// Keep only the matching cells of `by_profile`.
    pub fn apply(&self, by_profile: &ProfileSchemes) -> ProfileSchemes {
        by_profile
            .iter()
            .filter_map(|(profile, schemes)| {
                let kept: BTreeSet<String> = schemes
                    .iter()
                    .filter(|scheme| self.matches(profile, scheme))
                    .cloned()
                    .collect();
                (!kept.is_empty()).then(|| (profile.clone(), kept))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn cells(items: &[(&str, &str)]) -> Vec<Cell> {
        items
            .iter()
            .map(|(p, s)| (p.to_string(), s.to_string()))
            .collect()
    }

    #[test]
    fn test_group_shares_equal_scheme_sets() {
        let cells = cells(&[
            ("gcc5", "static"),
            ("gcc6", "static"),
            ("vs2019", "static"),
            ("vs2019", "shared"),
        ]);
        let entries = build(&cells);
        assert_eq!(
            entries,
            vec![
                MatrixEntry {
                    profiles: set(&["gcc5", "gcc6"]),
                    schemes: set(&["static"]),
                },
                MatrixEntry {
                    profiles: set(&["vs2019"]),
                    schemes: set(&["shared", "static"]),
                },
            ]
        );
    }

    #[test]
    fn test_group_keeps_overlapping_sets_apart() {
        let cells = cells(&[
            ("a", "static"),
            ("b", "static"),
            ("b", "shared"),
            ("c", "static"),
        ]);
        let entries = build(&cells);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].profiles, set(&["a", "c"]));
        assert_eq!(entries[1].profiles, set(&["b"]));
    }

    #[test]
    fn test_group_profiles_are_disjoint() {
        let cells = cells(&[
            ("p1", "x"),
            ("p2", "y"),
            ("p3", "x"),
            ("p4", "y"),
            ("p4", "x"),
        ]);
        let entries = build(&cells);
        let total: usize = entries.iter().map(|e| e.profiles.len()).sum();
        let union: BTreeSet<&String> = entries.iter().flat_map(|e| &e.profiles).collect();
        assert_eq!(total, union.len());
        assert_eq!(union.len(), 4);
    }

    #[test]
    fn test_group_empty() {
        assert!(build(&Vec::<Cell>::new()).is_empty());
    }

    #[test]
    fn test_job_count() {
        let entry = MatrixEntry {
            profiles: set(&["gcc5", "gcc6"]),
            schemes: set(&["shared", "static"]),
        };
        assert_eq!(entry.job_count(), 4);
    }

    #[test]
    fn test_union_into() {
        let mut into = by_profile(&cells(&[("gcc5", "static")]));
        let other = by_profile(&cells(&[("gcc5", "shared"), ("vs2019", "none")]));
        union_into(&mut into, &other);
        assert_eq!(into["gcc5"], set(&["shared", "static"]));
        assert_eq!(into["vs2019"], set(&["none"]));
    }

    #[test]
    fn test_filter_prefix_match() {
        let grouped = by_profile(&cells(&[
            ("gcc5", "static"),
            ("gcc5", "shared"),
            ("vs2019", "static"),
            ("xgcc", "static"),
        ]));
        let filter = MatrixFilter::new(Some("gcc"), Some("sta")).unwrap();
        let kept = filter.apply(&grouped);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept["gcc5"], set(&["static"]));
    }

    #[test]
    fn test_filter_default_matches_everything() {
        let filter = MatrixFilter::default();
        assert!(filter.matches("anything", "none"));
    }

    #[test]
    fn test_filter_invalid_pattern() {
        assert!(MatrixFilter::new(Some("gcc("), None).is_err());
    }
}
