use std::collections::BTreeSet;

use crate::decl::{Declaration, DeclarationKind};
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::resolve::{validate_identifier, validate_qualified_name, ResolveError, TypeResolver};
use crate::schema::{Field, Schema};

/// Which side of a mapping a declaration plays; only changes the reported code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Origin,
    Target,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{qualified_name} is not a data class: {reason}")]
    NotARecord {
        qualified_name: String,
        reason: String,
    },
    #[error("cannot resolve type of {qualified_name}.{field}: {source}")]
    UnresolvableField {
        qualified_name: String,
        field: String,
        #[source]
        source: ResolveError,
    },
    #[error("{qualified_name} declares field {field:?} more than once")]
    DuplicateField {
        qualified_name: String,
        field: String,
    },
    #[error("declaration {qualified_name} not found")]
    UnknownDeclaration { qualified_name: String },
    #[error("{qualified_name} has an invalid name {name:?}: {reason}")]
    InvalidName {
        qualified_name: String,
        name: String,
        reason: String,
    },
}

impl ValidationError {
    pub fn subject(&self) -> &str {
        match self {
            ValidationError::NotARecord { qualified_name, .. }
            | ValidationError::UnresolvableField { qualified_name, .. }
            | ValidationError::DuplicateField { qualified_name, .. }
            | ValidationError::UnknownDeclaration { qualified_name }
            | ValidationError::InvalidName { qualified_name, .. } => qualified_name,
        }
    }

    pub fn to_diagnostic(&self, role: Role) -> Diagnostic {
        let code = match (self, role) {
            (ValidationError::NotARecord { .. }, Role::Origin) => {
                DiagnosticCode::MM0100OriginNotARecord
            }
            (ValidationError::NotARecord { .. }, Role::Target) => {
                DiagnosticCode::MM0101TargetNotARecord
            }
            (ValidationError::UnresolvableField { .. }, _) => {
                DiagnosticCode::MM0110UnresolvableField
            }
            (ValidationError::DuplicateField { .. }, _) => DiagnosticCode::MM0120DuplicateField,
            (ValidationError::UnknownDeclaration { .. }, _) => {
                DiagnosticCode::MM0130UnknownDeclaration
            }
            (ValidationError::InvalidName { .. }, _) => DiagnosticCode::MM0140InvalidName,
        };
        Diagnostic::error(code, self.subject(), self.to_string())
    }
}

/// Turns a declaration into a [`Schema`], or explains why it cannot take part in a mapping.
///
/// Fields keep the order the declaration lists them in. Extension and computed
/// properties are skipped before any type is resolved. Every name that ends up in
/// generated code must be a plain identifier.
pub fn validate<R: TypeResolver + ?Sized>(
    decl: &Declaration,
    resolver: &R,
) -> Result<Schema, ValidationError> {
    let not_a_record = |reason: &str| ValidationError::NotARecord {
        qualified_name: decl.qualified_name.clone(),
        reason: reason.to_string(),
    };

    match decl.kind {
        DeclarationKind::Class => {}
        DeclarationKind::Interface => return Err(not_a_record("interfaces have no fields")),
        DeclarationKind::EnumClass | DeclarationKind::EnumEntry => {
            return Err(not_a_record("enums cannot be constructed"))
        }
        DeclarationKind::Object => return Err(not_a_record("objects cannot be constructed")),
        DeclarationKind::AnnotationClass => {
            return Err(not_a_record("annotation classes cannot be constructed"))
        }
    }
    if !decl.is_data() {
        return Err(not_a_record("class is missing the `data` modifier"));
    }
    if !decl.type_params.is_empty() {
        return Err(not_a_record(&format!(
            "generic declarations cannot be mapped (type params: {})",
            decl.type_params.join(", ")
        )));
    }

    let invalid_name = |name: &str, reason: String| ValidationError::InvalidName {
        qualified_name: decl.qualified_name.clone(),
        name: name.to_string(),
        reason,
    };
    validate_qualified_name(&decl.qualified_name)
        .map_err(|reason| invalid_name(&decl.qualified_name, reason))?;
    validate_identifier(decl.simple_name())
        .map_err(|reason| invalid_name(decl.simple_name(), reason))?;

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut fields = Vec::new();
    for prop in decl.properties.iter().filter(|p| p.is_primary_field()) {
        validate_identifier(&prop.name).map_err(|reason| invalid_name(&prop.name, reason))?;
        if !seen.insert(prop.name.as_str()) {
            return Err(ValidationError::DuplicateField {
                qualified_name: decl.qualified_name.clone(),
                field: prop.name.clone(),
            });
        }
        let ty = resolver
            .resolve(decl, prop)
            .map_err(|source| ValidationError::UnresolvableField {
                qualified_name: decl.qualified_name.clone(),
                field: prop.name.clone(),
                source,
            })?;
        fields.push(Field {
            name: prop.name.clone(),
            ty,
        });
    }

    Ok(Schema {
        qualified_name: decl.qualified_name.clone(),
        simple_name: decl.simple_name().to_string(),
        fields,
    })
}
