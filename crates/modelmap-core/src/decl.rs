//! Declaration manifest: the already-resolved declarations handed to the generator.
//!
//! The manifest is produced by whatever discovers marked declarations and parses source
//! text. The generator only reads it.

use std::collections::BTreeMap;

use modelmap_contracts::DECLARATIONS_SCHEMA_VERSION;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::{Diagnostic, DiagnosticCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {ptr:?}")]
pub struct ManifestError {
    pub message: String,
    pub ptr: String,
}

impl ManifestError {
    /// Reports a rejected manifest; `subject` names the manifest (usually its path).
    pub fn to_diagnostic(&self, subject: &str) -> Diagnostic {
        Diagnostic::error(
            DiagnosticCode::MM0001ManifestParseError,
            subject,
            self.to_string(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Class,
    Interface,
    EnumClass,
    EnumEntry,
    Object,
    AnnotationClass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub qualified_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_name: Option<String>,
    pub kind: DeclarationKind,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
    #[serde(default)]
    pub mappers: Vec<MapperMarker>,
}

impl Declaration {
    pub fn simple_name(&self) -> &str {
        match &self.simple_name {
            Some(s) => s.as_str(),
            None => self
                .qualified_name
                .rsplit('.')
                .next()
                .unwrap_or(self.qualified_name.as_str()),
        }
    }

    pub fn is_data(&self) -> bool {
        self.modifiers.iter().any(|m| m == "data")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    /// `None` when the upstream resolver could not give the property a type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeExpr>,
    /// Extension receiver; extension properties are not part of the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<TypeExpr>,
    #[serde(default)]
    pub computed: bool,
}

impl PropertyDecl {
    pub fn is_primary_field(&self) -> bool {
        self.receiver.is_none() && !self.computed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeExpr {
    pub name: String,
    #[serde(default)]
    pub args: Vec<TypeArgExpr>,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeArgExpr {
    /// Shorthand; only `"*"` is meaningful.
    Shorthand(String),
    Projection {
        #[serde(default)]
        variance: VarianceExpr,
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        ty: Option<TypeExpr>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceExpr {
    #[default]
    Invariant,
    Out,
    In,
    Star,
}

/// One repeatable mapper marker on an origin declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperMarker {
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationSet {
    pub schema_version: String,
    pub declarations: Vec<Declaration>,
}

/// An (origin, target) pair as discovered, before either side is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingCandidate<'a> {
    pub origin: &'a Declaration,
    pub target: &'a str,
}

impl DeclarationSet {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        DeclarationSet {
            schema_version: DECLARATIONS_SCHEMA_VERSION.to_string(),
            declarations,
        }
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.qualified_name == qualified_name)
    }

    /// One candidate per marker: origins in manifest order, markers in marker order.
    pub fn mapping_candidates(&self) -> Vec<MappingCandidate<'_>> {
        self.declarations
            .iter()
            .flat_map(|origin| {
                origin.mappers.iter().map(move |m| MappingCandidate {
                    origin,
                    target: m.target.as_str(),
                })
            })
            .collect()
    }
}

pub fn parse_manifest_json(bytes: &[u8]) -> Result<DeclarationSet, ManifestError> {
    let doc: Value = serde_json::from_slice(bytes).map_err(|e| ManifestError {
        message: e.to_string(),
        ptr: "".to_string(),
    })?;

    let version = doc
        .get("schema_version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ManifestError {
            message: "missing string schema_version".to_string(),
            ptr: "/schema_version".to_string(),
        })?;
    if version.trim() != DECLARATIONS_SCHEMA_VERSION {
        return Err(ManifestError {
            message: format!(
                "schema_version mismatch: expected {DECLARATIONS_SCHEMA_VERSION} got {version:?}"
            ),
            ptr: "/schema_version".to_string(),
        });
    }

    let set: DeclarationSet = serde_json::from_value(doc).map_err(|e| ManifestError {
        message: e.to_string(),
        ptr: "/declarations".to_string(),
    })?;

    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for (idx, d) in set.declarations.iter().enumerate() {
        if d.qualified_name.trim().is_empty() {
            return Err(ManifestError {
                message: "qualified_name must not be empty".to_string(),
                ptr: format!("/declarations/{idx}/qualified_name"),
            });
        }
        if let Some(first) = seen.insert(d.qualified_name.as_str(), idx) {
            return Err(ManifestError {
                message: format!(
                    "duplicate declaration {:?} (first at /declarations/{first})",
                    d.qualified_name
                ),
                ptr: format!("/declarations/{idx}/qualified_name"),
            });
        }
    }

    Ok(set)
}
