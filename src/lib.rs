//! # Bundle Synthesis Library
//!
//! This library resolves build order and CI job fan-out for a bundle of
//! interdependent native-library packages. It is used by the
//! `bundle-synthesis` command-line tool but can be embedded by any CI
//! generator or build orchestrator that needs the same answers.
//!
//! ## Quick Example
//!
//! ```
//! use bundle_synthesis::availability::AllAvailable;
//! use bundle_synthesis::bundle::Bundle;
//! use bundle_synthesis::config;
//! use bundle_synthesis::manifest::{ConanStyleResolver, MemoryLoader, PackageManifest};
//!
//! let resolved = config::parse(
//!     r#"
//! - profile: ["gcc{5|8}", vs2019]
//! - zlib
//! - openssl
//! "#,
//! )
//! .unwrap()
//! .resolve()
//! .unwrap();
//!
//! let loader = MemoryLoader::new()
//!     .with(PackageManifest::new("zlib", "1.2.11").with_schemes(&["static", "shared"]))
//!     .with(PackageManifest::new("openssl", "1.1.1").with_requires(&["zlib/1.2.11"]));
//!
//! let bundle = Bundle::load(&resolved, &loader, &ConanStyleResolver, AllAvailable).unwrap();
//!
//! assert_eq!(bundle.layout().unwrap().to_string(), "0: zlib\n1: openssl");
//! assert_eq!(bundle.used_by("zlib", false).unwrap().len(), 1);
//! assert_eq!(bundle.ci_matrix("zlib").unwrap().len(), 1);
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`, `profile`)**: The bundle configuration
//!   document, brace-expanded profile expressions and the base/override merge
//!   producing one [`config::PackageConfig`] per package.
//! - **Manifests (`manifest`, `availability`)**: The collaborators supplying
//!   package manifests, structured requirement references and the
//!   buildability predicate.
//! - **Bundle (`bundle`, `package`)**: The registry of loaded packages, the
//!   runtime graph and the holograph, plus per-package derived fields.
//! - **Layering (`graph`, `layout`)**: A minimal adjacency-set graph and the
//!   peeling algorithm partitioning it into parallel-buildable layers.
//! - **Matrices (`matrix`, `family`)**: Greedy grouping of buildable
//!   `(profile, scheme)` cells into CI job entries, optionally bucketed by
//!   compiler family.
//! - **Dump (`dump`)**: A serializable summary of everything above.
//!
//! ## Execution Flow
//!
//! 1.  **Configuration**: Parse the document and merge every override onto
//!     the base record.
//! 2.  **Loading**: Pair each non-repack package with its manifest and
//!     resolve its requirements.
//! 3.  **Graphs**: Build the runtime graph and the holograph, omitting edges
//!     whose versions do not match the bundle.
//! 4.  **Queries**: Layouts, reachability and matrices are computed on
//!     demand and cached for the bundle's lifetime.

pub mod availability;
pub mod bundle;
pub mod config;
pub mod dump;
pub mod error;
pub mod family;
pub mod graph;
pub mod layout;
pub mod manifest;
pub mod matrix;
pub mod output;
pub mod package;
pub mod profile;

#[cfg(test)]
mod layout_proptest;
