//! # Bundle Registry
//!
//! A [`Bundle`] owns every package resolved from one configuration document
//! and is the only place dependency graphs are built. Loading runs in one
//! pass:
//!
//! 1.  **Packages**: Every configured package except `repack` ones is paired
//!     with its manifest and its requirement declarations are resolved into
//!     [`Reference`]s.
//!
//! 2.  **Graphs**: Two [`DependencyGraph`]s are built from the packages:
//!     - the *runtime graph*, holding non-tool packages and runtime
//!       requirement edges between them;
//!     - the *holograph*, holding every package and both runtime and
//!       build-tool requirement edges.
//!
//!     An edge `P -> T` is added only when the version `P` asks for equals the
//!     version of `T` in the bundle exactly. A mismatch omits the edge and is
//!     recorded as a [`Diagnostic`]. A requirement on a package missing from
//!     the bundle fails the load with [`Error::UnresolvedReference`].
//!
//! 3.  **Special case**: the `protobuf -> protoc` edge is removed from the
//!     holograph, since the protobuf runtime and its compiler build from the
//!     same sources.
//!
//! Layouts, reachability and matrices are computed lazily afterwards and
//! cached; the bundle is never mutated after loading.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::availability::{AllAvailable, Availability};
use crate::config::{self, ResolvedConfig};
use crate::dump::BundleDump;
use crate::error::{Error, Result};
use crate::family::{self, FamilyMatrix};
use crate::graph::DependencyGraph;
use crate::layout::Layout;
use crate::manifest::{
    ConanStyleResolver, DirectoryLoader, ManifestLoader, Reference, ReferenceResolver,
};
use crate::matrix::MatrixEntry;
use crate::package::Package;

/// Edge removed from the holograph after construction.
const PROTOBUF_EDGE: (&str, &str) = ("protobuf", "protoc");

/// A requirement whose version differs from the one the bundle pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The requiring package.
    pub package: String,
    /// What the package asked for.
    pub reference: Reference,
    /// Version of the referenced package in the bundle.
    pub bundled: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requires {} but the bundle pins {}/{}",
            self.package, self.reference, self.reference.name, self.bundled
        )
    }
}

/// All packages of one bundle, their graphs and derived views.
pub struct Bundle {
    version: Option<String>,
    workbench: Option<String>,
    images: BTreeMap<String, String>,
    packages: Vec<Package>,
    index: HashMap<String, usize>,
    runtime_graph: DependencyGraph,
    holograph: DependencyGraph,
    diagnostics: Vec<Diagnostic>,
    availability: Box<dyn Availability>,
    layout: OnceLock<Layout>,
    tool_layout: OnceLock<Layout>,
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("version", &self.version)
            .field("workbench", &self.workbench)
            .field("packages", &self.packages)
            .field("runtime_graph", &self.runtime_graph)
            .field("holograph", &self.holograph)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl Bundle {
    /// Load every package of `config` and build both graphs.
    pub fn load(
        config: &ResolvedConfig,
        loader: &dyn ManifestLoader,
        resolver: &dyn ReferenceResolver,
        availability: impl Availability + 'static,
    ) -> Result<Self> {
        let mut packages = Vec::with_capacity(config.packages.len());
        for package_config in &config.packages {
            let manifest = loader.load(&package_config.name)?;
            if manifest.name != package_config.name {
                return Err(Error::ManifestParse {
                    name: package_config.name.clone(),
                    message: format!("manifest declares name '{}'", manifest.name),
                });
            }
            if package_config.repack {
                debug!("{}: repack package, excluded from the bundle", package_config.name);
                continue;
            }

            let resolve = |declarations: &[String]| {
                declarations
                    .iter()
                    .map(|d| resolver.resolve(&package_config.name, d))
                    .collect::<Result<Vec<_>>>()
            };
            let requires = resolve(&manifest.requires)?;
            let build_requires = resolve(&manifest.build_requires)?;
            packages.push(Package::new(
                package_config.clone(),
                manifest,
                requires,
                build_requires,
            ));
        }

        let index: HashMap<String, usize> = packages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name().to_string(), i))
            .collect();
        let graphs = build_graphs(&packages, &index)?;

        Ok(Self {
            version: config.version.clone(),
            workbench: config.workbench.clone(),
            images: family::image_table(&config.images),
            packages,
            index,
            runtime_graph: graphs.runtime,
            holograph: graphs.holograph,
            diagnostics: graphs.diagnostics,
            availability: Box::new(availability),
            layout: OnceLock::new(),
            tool_layout: OnceLock::new(),
        })
    }

    /// Load the bundle described by the configuration file at `config_path`.
    ///
    /// Manifests are read from `root`, defaulting to the configuration file's
    /// directory. Every profile/scheme combination counts as buildable.
    pub fn open(config_path: impl AsRef<Path>, root: Option<&Path>) -> Result<Self> {
        let config_path = config_path.as_ref();
        let resolved = config::from_file(config_path)?.resolve()?;
        Self::open_resolved(&resolved, config_path, root)
    }

    /// Like [`Bundle::open`], for a configuration already parsed and merged
    /// from `config_path`.
    pub fn open_resolved(
        resolved: &ResolvedConfig,
        config_path: &Path,
        root: Option<&Path>,
    ) -> Result<Self> {
        let root = root.map(Path::to_path_buf).unwrap_or_else(|| {
            config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        });
        Self::load(
            resolved,
            &DirectoryLoader::new(root),
            &ConanStyleResolver,
            AllAvailable,
        )
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn workbench(&self) -> Option<&str> {
        self.workbench.as_deref()
    }

    /// CI image per compiler family group.
    pub fn images(&self) -> &BTreeMap<String, String> {
        &self.images
    }

    /// Packages in configuration order.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.index.get(name).map(|&i| &self.packages[i])
    }

    /// Like [`Bundle::package`], failing with [`Error::UnknownPackage`].
    pub fn get(&self, name: &str) -> Result<&Package> {
        self.package(name).ok_or_else(|| Error::UnknownPackage {
            name: name.to_string(),
        })
    }

    pub fn runtime_graph(&self) -> &DependencyGraph {
        &self.runtime_graph
    }

    pub fn holograph(&self) -> &DependencyGraph {
        &self.holograph
    }

    /// Version mismatches found while building the graphs.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn availability(&self) -> &dyn Availability {
        self.availability.as_ref()
    }

    /// Layers of the runtime graph.
    pub fn layout(&self) -> Result<&Layout> {
        if let Some(layout) = self.layout.get() {
            return Ok(layout);
        }
        let layout = Layout::of(&self.runtime_graph)?;
        Ok(self.layout.get_or_init(|| layout))
    }

    /// Layers of the holograph restricted to tool packages and the packages
    /// they directly reference, including references pinned to another
    /// version than the bundle's.
    pub fn tool_layout(&self) -> Result<&Layout> {
        if let Some(layout) = self.tool_layout.get() {
            return Ok(layout);
        }
        let mut keep = BTreeSet::new();
        for tool in self.packages.iter().filter(|p| p.is_tool()) {
            keep.insert(tool.name().to_string());
            keep.extend(
                tool.references()
                    .filter(|r| self.index.contains_key(&r.name))
                    .map(|r| r.name.clone()),
            );
        }
        let layout = Layout::of(&self.holograph)?.restricted_to(&keep);
        Ok(self.tool_layout.get_or_init(|| layout))
    }

    /// See [`Package::used_by`].
    pub fn used_by(&self, name: &str, include_tools: bool) -> Result<&BTreeSet<String>> {
        Ok(self.get(name)?.used_by(self, include_tools))
    }

    /// See [`Package::needs_tool_config`].
    pub fn needs_tool_config(&self, name: &str) -> Result<bool> {
        Ok(self.get(name)?.needs_tool_config(self))
    }

    /// See [`Package::ci_matrix`].
    pub fn ci_matrix(&self, name: &str) -> Result<&[MatrixEntry]> {
        Ok(self.get(name)?.ci_matrix(self))
    }

    /// See [`Package::tool_matrix`].
    pub fn tool_matrix(&self, name: &str) -> Result<&[MatrixEntry]> {
        Ok(self.get(name)?.tool_matrix(self))
    }

    /// See [`Package::family_matrices`].
    pub fn family_matrices(&self, name: &str, tool: bool) -> Result<Vec<FamilyMatrix>> {
        Ok(self.get(name)?.family_matrices(self, tool))
    }

    /// CI matrix of every package, computed in parallel, in bundle order.
    pub fn ci_matrices(&self) -> Vec<(&str, &[MatrixEntry])> {
        self.packages
            .par_iter()
            .map(|package| (package.name(), package.ci_matrix(self)))
            .collect()
    }

    /// Serializable summary of the whole bundle.
    pub fn dump(&self) -> Result<BundleDump> {
        BundleDump::of(self)
    }
}

struct Graphs {
    runtime: DependencyGraph,
    holograph: DependencyGraph,
    diagnostics: Vec<Diagnostic>,
}

fn build_graphs(packages: &[Package], index: &HashMap<String, usize>) -> Result<Graphs> {
    let mut runtime = DependencyGraph::new();
    let mut holograph = DependencyGraph::new();
    let mut diagnostics = Vec::new();

    for package in packages {
        holograph.add_node(package.name());
        if !package.is_tool() {
            runtime.add_node(package.name());
        }
    }

    for package in packages {
        let mut checked = HashSet::new();
        let references = package
            .requires()
            .iter()
            .map(|r| (r, false))
            .chain(package.build_requires().iter().map(|r| (r, true)));

        for (reference, build_only) in references {
            let target = index
                .get(&reference.name)
                .map(|&i| &packages[i])
                .ok_or_else(|| Error::UnresolvedReference {
                    package: package.name().to_string(),
                    reference: reference.to_string(),
                })?;

            if target.version() != reference.version {
                if checked.insert(reference) {
                    let diagnostic = Diagnostic {
                        package: package.name().to_string(),
                        reference: reference.clone(),
                        bundled: target.version().to_string(),
                    };
                    warn!("{}", diagnostic);
                    diagnostics.push(diagnostic);
                }
                continue;
            }

            holograph.add_edge(package.name(), target.name());
            if build_only || package.is_tool() {
                continue;
            }
            if target.is_tool() {
                debug!(
                    "{}: runtime requirement on tool package {} left out of the runtime graph",
                    package.name(),
                    target.name()
                );
                continue;
            }
            runtime.add_edge(package.name(), target.name());
        }
    }

    let (from, to) = PROTOBUF_EDGE;
    if holograph.remove_edge(from, to) {
        debug!("Removed {} -> {} from the holograph", from, to);
    }

    Ok(Graphs {
        runtime,
        holograph,
        diagnostics,
    })
}
