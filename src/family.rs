//! Compiler-family CI matrices.
//!
//! CI runners are provisioned per compiler family (an MSVC host, a docker
//! image per GCC version and target architecture), so the generator wants a
//! package's buildable profiles bucketed by family before emitting jobs.
//! Profiles that belong to no known family are left out.
//!
//! | Profile           | Group       | Compiler | Arch      |
//! |-------------------|-------------|----------|-----------|
//! | `vs2019`, `vs2017d` | `MSVC`    | `MSVC`   | `x86_64`  |
//! | `vs2019-x86`      | `MSVC-x86`  | `MSVC`   | `x86`     |
//! | `gcc5`, `gcc5d`   | `gcc5`      | `gcc`    | `x86_64`  |
//! | `gcc8-armv7`      | `gcc8-armv7`| `gcc`    | `armv7`   |

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::matrix::ProfileSchemes;

/// Architecture assumed when a profile carries no suffix.
pub const DEFAULT_ARCH: &str = "x86_64";

/// Default docker image per GCC group.
pub const DEFAULT_IMAGES: [(&str, &str); 4] = [
    ("gcc5", "ubuntu:xenial"),
    ("gcc6", "ubuntu:xenial"),
    ("gcc7", "ubuntu:xenial"),
    ("gcc8", "ubuntu:bionic"),
];

/// Family a profile belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    pub group: String,
    pub compiler: String,
    pub arch: String,
}

/// CI matrix for one compiler family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyMatrix {
    pub group: String,
    pub compiler: String,
    pub arch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub profiles: BTreeSet<String>,
    pub schemes: BTreeSet<String>,
    /// Schemes per profile within the family.
    pub cells: ProfileSchemes,
}

fn msvc_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^vs20(?:17|19)(?:-(?P<arch>x86))?d?$")
            .unwrap_or_else(|e| unreachable!("MSVC profile pattern is valid: {e}"))
    })
}

fn gcc_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<name>gcc\d)(?:-(?P<arch>x86|armv7|armv8))?d?$")
            .unwrap_or_else(|e| unreachable!("GCC profile pattern is valid: {e}"))
    })
}

/// Classify `profile` into its compiler family.
pub fn classify(profile: &str) -> Option<Family> {
    if let Some(caps) = msvc_pattern().captures(profile) {
        let arch = caps.name("arch").map(|m| m.as_str());
        return Some(Family {
            group: arch.map_or_else(|| "MSVC".to_string(), |a| format!("MSVC-{}", a)),
            compiler: "MSVC".to_string(),
            arch: arch.unwrap_or(DEFAULT_ARCH).to_string(),
        });
    }

    let caps = gcc_pattern().captures(profile)?;
    let arch = caps.name("arch").map(|m| m.as_str());
    let name = &caps["name"];
    Some(Family {
        group: arch.map_or_else(|| name.to_string(), |a| format!("{}-{}", name, a)),
        compiler: "gcc".to_string(),
        arch: arch.unwrap_or(DEFAULT_ARCH).to_string(),
    })
}

/// The default image table with `overrides` applied on top.
pub fn image_table(overrides: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut table: BTreeMap<String, String> = DEFAULT_IMAGES
        .iter()
        .map(|(group, image)| (group.to_string(), image.to_string()))
        .collect();
    table.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    table
}

/// Bucket `cells` by compiler family, one matrix per group in group order.
pub fn matrices(cells: &ProfileSchemes, images: &BTreeMap<String, String>) -> Vec<FamilyMatrix> {
    let mut families: BTreeMap<String, FamilyMatrix> = BTreeMap::new();
    for (profile, schemes) in cells {
        let Some(family) = classify(profile) else {
            continue;
        };
        let matrix = families
            .entry(family.group.clone())
            .or_insert_with(|| FamilyMatrix {
                image: if family.compiler == "gcc" {
                    images.get(&family.group).cloned()
                } else {
                    None
                },
                group: family.group,
                compiler: family.compiler,
                arch: family.arch,
                profiles: BTreeSet::new(),
                schemes: BTreeSet::new(),
                cells: ProfileSchemes::new(),
            });
        matrix.profiles.insert(profile.clone());
        matrix.schemes.extend(schemes.iter().cloned());
        matrix
            .cells
            .entry(profile.clone())
            .or_default()
            .extend(schemes.iter().cloned());
    }
    families.into_values().collect()
}

/// Union of the schemes of every family matching `compiler` and `arch`.
pub fn schemes(matrices: &[FamilyMatrix], compiler: Option<&str>, arch: Option<&str>) -> BTreeSet<String> {
    matrices
        .iter()
        .filter(|m| compiler.is_none_or(|c| c == m.compiler))
        .filter(|m| arch.is_none_or(|a| a == m.arch))
        .flat_map(|m| m.schemes.iter().cloned())
        .collect()
}
