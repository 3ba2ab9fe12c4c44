//! # Bundle Configuration
//!
//! This module defines the bundle configuration document and the merge rules
//! that turn it into one resolved [`PackageConfig`] per package.
//!
//! ## Document format
//!
//! The document is a YAML sequence. The first entry is the base record whose
//! settings every package inherits; each following entry overrides the base
//! for one package and is either a bare package name or a mapping:
//!
//! ```yaml
//! - version: "2.1"
//!   workbench: oss
//!   profile: [vs2019, "gcc{5|8}", "gcc{5|8}-x86"]
//! - zlib
//! - name: protoc
//!   tool: true
//!   +profile: vs2017
//! - name: openssl
//!   -profile: gcc5
//!   program: openssl
//! ```
//!
//! ## Merge rules
//!
//! - `tool`, `repack`, `name` and `version` replace the base value only when
//!   the override sets them.
//! - `profile` replaces the base profile set entirely. Otherwise `-profile` is
//!   removed from, then `+profile` added to, the base's expanded set. An
//!   explicit `profile` wins over `+profile`/`-profile` on the same entry.
//! - `program` is normalized to `platform -> [program]`; a bare string or a
//!   list is broadcast to both `Windows` and `Linux`. Without an override the
//!   base program is inherited.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::manifest::version_string;
use crate::profile::ProfileSpec;

/// Platforms a bare `program` value is broadcast to.
pub const PLATFORMS: [&str; 2] = ["Windows", "Linux"];

/// One or more program names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgramList {
    One(String),
    Many(Vec<String>),
}

impl ProgramList {
    fn into_vec(self) -> Vec<String> {
        match self {
            ProgramList::One(program) => vec![program],
            ProgramList::Many(programs) => programs,
        }
    }
}

/// The `program` field as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgramSpec {
    /// Same program list on every platform.
    All(ProgramList),
    /// Explicit list per platform.
    PerPlatform(BTreeMap<String, ProgramList>),
}

impl ProgramSpec {
    /// Normalize into a `platform -> programs` map.
    pub fn normalize(&self) -> BTreeMap<String, Vec<String>> {
        match self.clone() {
            ProgramSpec::All(list) => {
                let programs = list.into_vec();
                PLATFORMS
                    .iter()
                    .map(|platform| (platform.to_string(), programs.clone()))
                    .collect()
            }
            ProgramSpec::PerPlatform(map) => map
                .into_iter()
                .map(|(platform, list)| (platform, list.into_vec()))
                .collect(),
        }
    }
}

/// A base or override record, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "version_string::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repack: Option<bool>,
    /// `Some(None)` for an explicit `profile: null`, which empties the set.
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile: Option<Option<ProfileSpec>>,
    #[serde(default, rename = "+profile", skip_serializing_if = "Option::is_none")]
    pub add_profile: Option<ProfileSpec>,
    #[serde(default, rename = "-profile", skip_serializing_if = "Option::is_none")]
    pub remove_profile: Option<ProfileSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<ProgramSpec>,
    /// Workbench name (base record only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbench: Option<String>,
    /// CI image overrides per compiler family (base record only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<BTreeMap<String, String>>,
}

impl ConfigRecord {
    /// An override record for `name` with nothing else set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Keeps a present-but-null field distinct from an absent one.
fn explicit_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Entry {
    Name(String),
    Record(ConfigRecord),
}

/// Resolved configuration of one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub tool: bool,
    pub repack: bool,
    pub profile: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub program: BTreeMap<String, Vec<String>>,
}

/// Merge `record` on top of an already resolved `base`.
pub fn merge(base: &PackageConfig, record: &ConfigRecord) -> Result<PackageConfig> {
    let profile = match &record.profile {
        Some(None) => BTreeSet::new(),
        Some(Some(profile)) => {
            if record.add_profile.is_some() || record.remove_profile.is_some() {
                warn!(
                    "{}: explicit 'profile' set, ignoring '+profile'/'-profile'",
                    record.name.as_deref().unwrap_or("<base>")
                );
            }
            profile.expand()?
        }
        None => {
            let mut profile = base.profile.clone();
            if let Some(remove) = &record.remove_profile {
                let remove = remove.expand()?;
                profile.retain(|p| !remove.contains(p));
            }
            if let Some(add) = &record.add_profile {
                profile.extend(add.expand()?);
            }
            profile
        }
    };

    Ok(PackageConfig {
        name: record.name.clone().unwrap_or_else(|| base.name.clone()),
        version: record.version.clone().or_else(|| base.version.clone()),
        tool: record.tool.unwrap_or(base.tool),
        repack: record.repack.unwrap_or(base.repack),
        profile,
        program: record
            .program
            .as_ref()
            .map(ProgramSpec::normalize)
            .unwrap_or_else(|| base.program.clone()),
    })
}

/// The parsed configuration document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    pub base: ConfigRecord,
    pub overrides: Vec<ConfigRecord>,
}

impl ConfigDocument {
    /// Resolve the base record and every override.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let base = merge(&PackageConfig::default(), &self.base)?;

        let mut seen = HashSet::new();
        let mut packages = Vec::with_capacity(self.overrides.len());
        for record in &self.overrides {
            let name = record.name.as_deref().ok_or_else(|| Error::ConfigParse {
                message: "Package entry without a name".to_string(),
                hint: Some("Every entry after the first needs a 'name' field".to_string()),
            })?;
            if !seen.insert(name.to_string()) {
                return Err(Error::ConfigParse {
                    message: format!("Duplicate package '{}'", name),
                    hint: Some("Merge the entries into one".to_string()),
                });
            }
            packages.push(merge(&base, record)?);
        }

        Ok(ResolvedConfig {
            version: self.base.version.clone(),
            workbench: self.base.workbench.clone(),
            images: self.base.images.clone().unwrap_or_default(),
            base,
            packages,
        })
    }
}

/// The configuration after merging, one entry per package in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    pub version: Option<String>,
    pub workbench: Option<String>,
    pub images: BTreeMap<String, String>,
    pub base: PackageConfig,
    pub packages: Vec<PackageConfig>,
}

impl ResolvedConfig {
    pub fn package(&self, name: &str) -> Option<&PackageConfig> {
        self.packages.iter().find(|p| p.name == name)
    }
}

/// Parse a configuration document from YAML text.
pub fn parse(yaml_content: &str) -> Result<ConfigDocument> {
    let entries: Option<Vec<Entry>> = serde_yaml::from_str(yaml_content)?;
    let mut entries = entries.unwrap_or_default().into_iter();

    let base = match entries.next() {
        Some(Entry::Record(record)) => record,
        Some(Entry::Name(name)) => {
            return Err(Error::ConfigParse {
                message: format!("First entry '{}' must be the base settings mapping", name),
                hint: Some("Start the document with a mapping such as '- profile: [...]'".into()),
            })
        }
        None => {
            return Err(Error::ConfigParse {
                message: "Empty configuration document".to_string(),
                hint: Some("The first entry must hold the base settings".to_string()),
            })
        }
    };

    let overrides = entries
        .map(|entry| {
            let record = match entry {
                Entry::Name(name) => ConfigRecord::named(name),
                Entry::Record(record) => record,
            };
            if record.workbench.is_some() || record.images.is_some() {
                return Err(Error::ConfigParse {
                    message: format!(
                        "'workbench' and 'images' are only allowed in the base entry ({})",
                        record.name.as_deref().unwrap_or("<unnamed>")
                    ),
                    hint: None,
                });
            }
            Ok(record)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ConfigDocument { base, overrides })
}

/// Parse a configuration document from a YAML file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ConfigDocument> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}
