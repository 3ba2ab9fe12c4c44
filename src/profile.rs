//! # Profile Expressions
//!
//! Profiles are written in a compact brace-alternation syntax so that a
//! configuration can list a whole compiler family in one entry:
//!
//! ```
//! use bundle_synthesis::profile::expand_expression;
//!
//! let profiles = expand_expression("gcc{5|6}-x86").unwrap();
//! assert!(profiles.contains("gcc5-x86"));
//! assert!(profiles.contains("gcc6-x86"));
//! assert_eq!(expand_expression("vs2019").unwrap().len(), 1);
//! ```
//!
//! An expression is a `name` (word characters, `/`, `.` and `-`), optionally
//! followed by one `{alt|alt|...}` group and a suffix. Alternatives may be
//! empty, so `gcc5{|d}` names both `gcc5` and `gcc5d`. Lists of expressions
//! may nest arbitrarily and are flattened.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A profile field as it appears in the configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileSpec {
    /// A single expression, e.g. `gcc{5|6}`.
    One(String),
    /// A (possibly nested) list of expressions.
    Many(Vec<ProfileSpec>),
}

impl ProfileSpec {
    /// Expand every expression in this tree into concrete profile names.
    pub fn expand(&self) -> Result<BTreeSet<String>> {
        let mut profiles = BTreeSet::new();
        self.expand_into(&mut profiles)?;
        Ok(profiles)
    }

    fn expand_into(&self, profiles: &mut BTreeSet<String>) -> Result<()> {
        match self {
            ProfileSpec::One(expr) => profiles.extend(expand_expression(expr)?),
            ProfileSpec::Many(items) => {
                for item in items {
                    item.expand_into(profiles)?;
                }
            }
        }
        Ok(())
    }
}

impl From<&str> for ProfileSpec {
    fn from(expr: &str) -> Self {
        ProfileSpec::One(expr.to_string())
    }
}

impl From<Vec<&str>> for ProfileSpec {
    fn from(exprs: Vec<&str>) -> Self {
        ProfileSpec::Many(exprs.into_iter().map(ProfileSpec::from).collect())
    }
}

fn expression_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<name>[\w/.\-]+)\s*(?:\{(?P<alts>[^{}]*)\}(?P<suffix>[\w\-]*))?$")
            .unwrap_or_else(|e| unreachable!("profile expression pattern is valid: {e}"))
    })
}

/// Expand a single profile expression.
pub fn expand_expression(expr: &str) -> Result<BTreeSet<String>> {
    let invalid = |message: &str| Error::ProfileExpression {
        expression: expr.to_string(),
        message: message.to_string(),
    };

    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty expression"));
    }

    let mut depth = 0usize;
    let mut groups = 0usize;
    for ch in trimmed.chars() {
        match ch {
            '{' => {
                if depth > 0 {
                    return Err(invalid("nested '{' is not supported"));
                }
                depth += 1;
                groups += 1;
            }
            '}' => {
                if depth == 0 {
                    return Err(invalid("unmatched '}'"));
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(invalid("unmatched '{'"));
    }
    if groups > 1 {
        return Err(invalid("only one '{...}' group is allowed"));
    }

    let caps = expression_pattern()
        .captures(trimmed)
        .ok_or_else(|| invalid("expected name{alt|alt}suffix"))?;

    let name = &caps["name"];
    let Some(alts) = caps.name("alts") else {
        return Ok(BTreeSet::from([name.to_string()]));
    };
    let suffix = caps.name("suffix").map_or("", |m| m.as_str());

    Ok(alts
        .as_str()
        .split('|')
        .map(|alt| format!("{}{}{}", name, alt.trim(), suffix))
        .collect())
}
