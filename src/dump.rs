//! Serializable summary of a resolved bundle.
//!
//! [`BundleDump`] collects the layouts and every package's derived fields
//! into one plain value that CI generators can consume as YAML or JSON.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::bundle::{Bundle, Diagnostic};
use crate::error::Result;
use crate::layout::Layout;
use crate::matrix::MatrixEntry;
use crate::package::Package;

/// Output formats of [`BundleDump::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpFormat {
    #[default]
    Yaml,
    Json,
}

/// Derived data of one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDump {
    pub name: String,
    pub version: String,
    pub tool: bool,
    pub profiles: BTreeSet<String>,
    pub schemes: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub program: BTreeMap<String, Vec<String>>,
    pub used_by: BTreeSet<String>,
    pub tool_used_by: BTreeSet<String>,
    pub needs_tool_config: bool,
    pub matrix: Vec<MatrixEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_matrix: Vec<MatrixEntry>,
}

impl PackageDump {
    fn of(package: &Package, bundle: &Bundle) -> Self {
        Self {
            name: package.name().to_string(),
            version: package.version().to_string(),
            tool: package.is_tool(),
            profiles: package.profiles().clone(),
            schemes: package.schemes(),
            program: package.program().clone(),
            used_by: package.used_by(bundle, false).clone(),
            tool_used_by: package.used_by(bundle, true).clone(),
            needs_tool_config: package.needs_tool_config(bundle),
            matrix: package.ci_matrix(bundle).to_vec(),
            tool_matrix: package.tool_matrix(bundle).to_vec(),
        }
    }
}

/// Everything a CI generator needs from a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleDump {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workbench: Option<String>,
    pub layout: Layout,
    #[serde(rename = "tool-layout")]
    pub tool_layout: Layout,
    pub packages: Vec<PackageDump>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl BundleDump {
    /// Collect the dump of `bundle`. Fails when either layout has a cycle.
    pub fn of(bundle: &Bundle) -> Result<Self> {
        Ok(Self {
            version: bundle.version().map(str::to_string),
            workbench: bundle.workbench().map(str::to_string),
            layout: bundle.layout()?.clone(),
            tool_layout: bundle.tool_layout()?.clone(),
            packages: bundle
                .packages()
                .iter()
                .map(|package| PackageDump::of(package, bundle))
                .collect(),
            diagnostics: bundle.diagnostics().to_vec(),
        })
    }

    pub fn render(&self, format: DumpFormat) -> Result<String> {
        Ok(match format {
            DumpFormat::Yaml => serde_yaml::to_string(self)?,
            DumpFormat::Json => serde_json::to_string_pretty(self)?,
        })
    }
}
