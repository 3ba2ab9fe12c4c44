//! # Package Manifests
//!
//! Every package in a bundle ships a `package.yml` manifest declaring its
//! identity, its runtime and build-tool requirements, the build schemes it
//! supports and the programs it installs. This module holds the parsed
//! [`PackageManifest`] and the two collaborators the resolver uses to obtain
//! one:
//!
//! - [`ManifestLoader`]: returns the manifest for a package name. The default
//!   [`DirectoryLoader`] reads `<root>/<name>/package.yml`; [`MemoryLoader`]
//!   serves manifests held in memory.
//! - [`ReferenceResolver`]: turns a raw requirement declaration into a
//!   structured [`Reference`]. The resolver never interprets requirement
//!   syntax itself; [`ConanStyleResolver`] handles `name/version@user/channel`.
//!
//! ## Manifest format
//!
//! ```yaml
//! name: zlib
//! version: 1.2.11
//! scheme:
//!   shared: {}
//!   static: {}
//! dependencies:
//!   - openssl/1.1.1g
//! # or, as a mapping:
//! # dependencies:
//! #   openssl: 1.1.1g
//! #   bzip2: {version: 1.0.8, user: epm, channel: stable}
//! build-tools:
//!   - cmake/3.17.0
//! program:
//!   - zpipe
//!   - name: minigzip
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// File name of a package manifest inside its package directory.
pub const MANIFEST_FILE: &str = "package.yml";

/// A parsed package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    /// Raw runtime requirement declarations.
    pub requires: Vec<String>,
    /// Raw build-tool requirement declarations.
    pub build_requires: Vec<String>,
    /// Supported scheme names, sorted.
    pub schemes: Vec<String>,
    /// Installed programs, in declaration order.
    pub programs: Vec<String>,
}

impl PackageManifest {
    /// Create a manifest with no requirements, schemes or programs.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            requires: Vec::new(),
            build_requires: Vec::new(),
            schemes: Vec::new(),
            programs: Vec::new(),
        }
    }

    pub fn with_requires(mut self, declarations: &[&str]) -> Self {
        self.requires = declarations.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_build_requires(mut self, declarations: &[&str]) -> Self {
        self.build_requires = declarations.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_schemes(mut self, schemes: &[&str]) -> Self {
        self.schemes = schemes.iter().map(|s| s.to_string()).collect();
        self.schemes.sort();
        self
    }

    pub fn with_programs(mut self, programs: &[&str]) -> Self {
        self.programs = programs.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Parse a manifest from YAML text.
    pub fn parse(yaml: &str) -> Result<Self> {
        let raw: RawManifest = serde_yaml::from_str(yaml)?;
        Ok(raw.into())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemeField {
    Map(BTreeMap<String, serde_yaml::Value>),
    List(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProgramEntry {
    Name(String),
    Detailed { name: String },
}

/// Requirements are either a list of `name/version` declarations or a
/// mapping from package name to a version or a detail record.
#[derive(Deserialize)]
#[serde(untagged)]
enum RequirementField {
    List(Vec<String>),
    Map(BTreeMap<String, RequirementValue>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequirementValue {
    Version(version_string::VersionValue),
    Detailed {
        version: version_string::VersionValue,
        #[serde(default)]
        user: Option<String>,
        #[serde(default)]
        channel: Option<String>,
    },
}

impl RequirementField {
    fn into_declarations(self) -> Vec<String> {
        match self {
            RequirementField::List(list) => list,
            RequirementField::Map(map) => map
                .into_iter()
                .map(|(name, value)| match value {
                    RequirementValue::Version(version) => {
                        format!("{}/{}", name, version.into_string())
                    }
                    RequirementValue::Detailed {
                        version,
                        user,
                        channel,
                    } => {
                        let version = version.into_string();
                        match (user, channel) {
                            (Some(user), Some(channel)) => {
                                format!("{}/{}@{}/{}", name, version, user, channel)
                            }
                            _ => format!("{}/{}", name, version),
                        }
                    }
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct RawManifest {
    name: String,
    #[serde(deserialize_with = "version_string::deserialize")]
    version: String,
    #[serde(default)]
    dependencies: Option<RequirementField>,
    #[serde(default, rename = "build-tools")]
    build_tools: Option<RequirementField>,
    #[serde(default)]
    scheme: Option<SchemeField>,
    #[serde(default)]
    program: Vec<ProgramEntry>,
}

impl From<RawManifest> for PackageManifest {
    fn from(raw: RawManifest) -> Self {
        let mut schemes = match raw.scheme {
            Some(SchemeField::Map(map)) => map.into_keys().collect(),
            Some(SchemeField::List(list)) => list,
            None => Vec::new(),
        };
        schemes.sort();
        schemes.dedup();

        let programs = raw
            .program
            .into_iter()
            .map(|entry| match entry {
                ProgramEntry::Name(name) | ProgramEntry::Detailed { name } => name,
            })
            .collect();

        Self {
            name: raw.name,
            version: raw.version,
            requires: raw
                .dependencies
                .map(RequirementField::into_declarations)
                .unwrap_or_default(),
            build_requires: raw
                .build_tools
                .map(RequirementField::into_declarations)
                .unwrap_or_default(),
            schemes,
            programs,
        }
    }
}

/// Version fields may be written as YAML strings or bare numbers.
///
/// Numbers are rendered back with their shortest representation, so quote
/// versions such as `"2.10"` whose trailing zeros matter.
pub(crate) mod version_string {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(crate) enum VersionValue {
        Text(String),
        Int(i64),
        Float(f64),
    }

    impl VersionValue {
        pub(crate) fn into_string(self) -> String {
            match self {
                VersionValue::Text(s) => s,
                VersionValue::Int(i) => i.to_string(),
                VersionValue::Float(f) => f.to_string(),
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        VersionValue::deserialize(deserializer).map(VersionValue::into_string)
    }

    pub fn deserialize_option<'de, D>(
        deserializer: D,
    ) -> std::result::Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<VersionValue>::deserialize(deserializer).map(|v| v.map(VersionValue::into_string))
    }
}

/// A structured requirement: the referenced package and the exact version
/// it asks for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Reference {
    pub name: String,
    pub version: String,
}

impl Reference {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// Supplies manifests by package name.
pub trait ManifestLoader {
    /// Load the manifest of `name`, failing with [`Error::UnknownPackage`]
    /// when the package has none.
    fn load(&self, name: &str) -> Result<PackageManifest>;
}

/// Turns raw requirement declarations into [`Reference`]s.
pub trait ReferenceResolver {
    /// Resolve one declaration found in the manifest of `package`.
    fn resolve(&self, package: &str, declaration: &str) -> Result<Reference>;
}

/// Reads `<root>/<name>/package.yml`.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn manifest_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join(MANIFEST_FILE)
    }
}

impl ManifestLoader for DirectoryLoader {
    fn load(&self, name: &str) -> Result<PackageManifest> {
        let path = self.manifest_path(name);
        if !path.is_file() {
            return Err(Error::UnknownPackage {
                name: name.to_string(),
            });
        }
        let content = std::fs::read_to_string(&path)?;
        PackageManifest::parse(&content).map_err(|e| Error::ManifestParse {
            name: name.to_string(),
            message: format!("{}: {}", path.display(), e),
        })
    }
}

/// Serves manifests from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    manifests: HashMap<String, PackageManifest>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a manifest under its own name.
    pub fn insert(&mut self, manifest: PackageManifest) {
        self.manifests.insert(manifest.name.clone(), manifest);
    }

    pub fn with(mut self, manifest: PackageManifest) -> Self {
        self.insert(manifest);
        self
    }
}

impl ManifestLoader for MemoryLoader {
    fn load(&self, name: &str) -> Result<PackageManifest> {
        self.manifests
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownPackage {
                name: name.to_string(),
            })
    }
}

/// Resolves `name/version` declarations, ignoring any `@user/channel` part.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConanStyleResolver;

impl ReferenceResolver for ConanStyleResolver {
    fn resolve(&self, package: &str, declaration: &str) -> Result<Reference> {
        let malformed = || Error::ManifestParse {
            name: package.to_string(),
            message: format!(
                "requirement '{}' is not of the form name/version",
                declaration
            ),
        };

        let reference = declaration.split('@').next().unwrap_or_default().trim();
        let (name, version) = reference.split_once('/').ok_or_else(malformed)?;
        let (name, version) = (name.trim(), version.trim());
        if name.is_empty() || version.is_empty() || version.contains('/') {
            return Err(malformed());
        }
        Ok(Reference::new(name, version))
    }
}
