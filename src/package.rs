//! # Package Model
//!
//! A [`Package`] pairs a package's manifest with its resolved configuration
//! and carries every field derived from them. Derived fields are computed on
//! first access and cached for the package's lifetime; nothing is ever
//! invalidated because a bundle is immutable once loaded.
//!
//! Derived fields that depend on the rest of the bundle (reachability, the
//! availability predicate) take the owning [`Bundle`] as an argument. Passing
//! any other bundle is a logic error.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use crate::bundle::Bundle;
use crate::config::{PackageConfig, PLATFORMS};
use crate::error::Result;
use crate::family::{self, FamilyMatrix};
use crate::manifest::{PackageManifest, Reference};
use crate::matrix::{self, Cell, MatrixEntry, MatrixFilter, ProfileSchemes};

/// Scheme used for packages that declare none.
pub const NO_SCHEME: &str = "none";

/// Map the spellings of "no scheme" onto [`NO_SCHEME`].
pub fn normalize_scheme(scheme: &str) -> &str {
    match scheme {
        "None" | "none" | "default" => NO_SCHEME,
        other => other,
    }
}

/// One package of a bundle.
#[derive(Debug)]
pub struct Package {
    config: PackageConfig,
    manifest: PackageManifest,
    requires: Vec<Reference>,
    build_requires: Vec<Reference>,
    availability_matrix: OnceLock<BTreeSet<Cell>>,
    used_by: OnceLock<BTreeSet<String>>,
    tool_used_by: OnceLock<BTreeSet<String>>,
    ci_matrix: OnceLock<Vec<MatrixEntry>>,
    tool_matrix: OnceLock<Vec<MatrixEntry>>,
}

impl Package {
    /// Combine a resolved configuration with its manifest and resolved
    /// references.
    ///
    /// A package with no configured program exposes the first program of its
    /// manifest on every platform.
    pub fn new(
        mut config: PackageConfig,
        manifest: PackageManifest,
        requires: Vec<Reference>,
        build_requires: Vec<Reference>,
    ) -> Self {
        if config.program.is_empty() {
            if let Some(first) = manifest.programs.first() {
                config.program = PLATFORMS
                    .iter()
                    .map(|platform| (platform.to_string(), vec![first.clone()]))
                    .collect();
            }
        }

        Self {
            config,
            manifest,
            requires,
            build_requires,
            availability_matrix: OnceLock::new(),
            used_by: OnceLock::new(),
            tool_used_by: OnceLock::new(),
            ci_matrix: OnceLock::new(),
            tool_matrix: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Version from the manifest.
    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    pub fn is_tool(&self) -> bool {
        self.config.tool
    }

    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    pub fn profiles(&self) -> &BTreeSet<String> {
        &self.config.profile
    }

    pub fn program(&self) -> &BTreeMap<String, Vec<String>> {
        &self.config.program
    }

    /// Runtime requirements.
    pub fn requires(&self) -> &[Reference] {
        &self.requires
    }

    /// Build-tool requirements.
    pub fn build_requires(&self) -> &[Reference] {
        &self.build_requires
    }

    /// Runtime and build-tool requirements together.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.requires.iter().chain(self.build_requires.iter())
    }

    /// Normalized scheme names, or just `none` when the manifest has none.
    pub fn schemes(&self) -> BTreeSet<String> {
        if self.manifest.schemes.is_empty() {
            return BTreeSet::from([NO_SCHEME.to_string()]);
        }
        self.manifest
            .schemes
            .iter()
            .map(|scheme| normalize_scheme(scheme).to_string())
            .collect()
    }

    /// Buildable `(profile, scheme)` cells.
    pub fn availability_matrix(&self, bundle: &Bundle) -> &BTreeSet<Cell> {
        self.availability_matrix.get_or_init(|| {
            let schemes = self.schemes();
            let availability = bundle.availability();
            self.config
                .profile
                .iter()
                .flat_map(|profile| schemes.iter().map(move |scheme| (profile, scheme)))
                .filter(|(profile, scheme)| availability.is_available(self.name(), profile, scheme))
                .map(|(profile, scheme)| (profile.clone(), scheme.clone()))
                .collect()
        })
    }

    /// Packages with a dependency path to this one.
    ///
    /// Without `include_tools` the runtime graph is searched and every
    /// dependent is returned. With it the holograph is searched and only
    /// tool packages are kept.
    pub fn used_by(&self, bundle: &Bundle, include_tools: bool) -> &BTreeSet<String> {
        let cell = if include_tools {
            &self.tool_used_by
        } else {
            &self.used_by
        };
        cell.get_or_init(|| {
            let graph = if include_tools {
                bundle.holograph()
            } else {
                bundle.runtime_graph()
            };
            if !graph.contains(self.name()) {
                return BTreeSet::new();
            }
            graph
                .nodes()
                .filter(|node| *node != self.name())
                .filter(|node| {
                    !include_tools || bundle.package(node).is_some_and(Package::is_tool)
                })
                .filter(|node| graph.has_path(node, self.name()))
                .map(str::to_string)
                .collect()
        })
    }

    /// Whether a tool-flavored CI configuration must be generated: the
    /// package is not a tool itself but some tool requires it.
    pub fn needs_tool_config(&self, bundle: &Bundle) -> bool {
        !self.is_tool() && !self.used_by(bundle, true).is_empty()
    }

    /// Grouped CI matrix of the package.
    pub fn ci_matrix(&self, bundle: &Bundle) -> &[MatrixEntry] {
        self.ci_matrix
            .get_or_init(|| matrix::build(self.availability_matrix(bundle)))
    }

    /// Cells every tool requiring this package must be able to build with.
    pub fn tool_cells(&self, bundle: &Bundle) -> ProfileSchemes {
        let mut cells = ProfileSchemes::new();
        for name in self.used_by(bundle, true) {
            if let Some(tool) = bundle.package(name) {
                matrix::union_into(
                    &mut cells,
                    &matrix::by_profile(tool.availability_matrix(bundle)),
                );
            }
        }
        cells
    }

    /// Grouped union of the matrices of every tool requiring this package.
    pub fn tool_matrix(&self, bundle: &Bundle) -> &[MatrixEntry] {
        self.tool_matrix
            .get_or_init(|| matrix::group(&self.tool_cells(bundle)))
    }

    /// Buildable cells grouped by profile, or the tool cells when `tool`.
    pub fn cells(&self, bundle: &Bundle, tool: bool) -> ProfileSchemes {
        if tool {
            self.tool_cells(bundle)
        } else {
            matrix::by_profile(self.availability_matrix(bundle))
        }
    }

    /// The package's matrix (or its tool matrix) restricted by profile and
    /// scheme patterns.
    pub fn filter_matrix(
        &self,
        bundle: &Bundle,
        profile: Option<&str>,
        scheme: Option<&str>,
        tool: bool,
    ) -> Result<Vec<MatrixEntry>> {
        let filter = MatrixFilter::new(profile, scheme)?;
        Ok(matrix::group(&filter.apply(&self.cells(bundle, tool))))
    }

    /// Buildable cells bucketed by compiler family.
    pub fn family_matrices(&self, bundle: &Bundle, tool: bool) -> Vec<FamilyMatrix> {
        family::matrices(&self.cells(bundle, tool), bundle.images())
    }

    /// Union of the schemes the package builds with `compiler` on `arch`.
    pub fn family_schemes(
        &self,
        bundle: &Bundle,
        compiler: Option<&str>,
        arch: Option<&str>,
    ) -> BTreeSet<String> {
        family::schemes(&self.family_matrices(bundle, false), compiler, arch)
    }
}
