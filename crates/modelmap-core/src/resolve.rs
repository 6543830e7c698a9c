//! Property type resolution.
//!
//! The generator never inspects source text. It asks a [`TypeResolver`] for one
//! [`TypeRef`] per field while building a schema.

use crate::decl::{Declaration, PropertyDecl, TypeArgExpr, TypeExpr, VarianceExpr};
use crate::schema::{GenericArg, TypeRef, Variance};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {ptr}")]
pub struct ResolveError {
    pub message: String,
    /// Path inside the property's type expression, e.g. `type/args/0/type`.
    pub ptr: String,
}

pub trait TypeResolver {
    fn resolve(
        &self,
        owner: &Declaration,
        property: &PropertyDecl,
    ) -> Result<TypeRef, ResolveError>;
}

/// Resolves the type expressions carried by the declaration manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestResolver;

impl TypeResolver for ManifestResolver {
    fn resolve(
        &self,
        _owner: &Declaration,
        property: &PropertyDecl,
    ) -> Result<TypeRef, ResolveError> {
        let Some(ty) = &property.ty else {
            return Err(ResolveError {
                message: format!("property {:?} has no resolved type", property.name),
                ptr: "type".to_string(),
            });
        };
        resolve_type_expr(ty, "type")
    }
}

pub fn resolve_type_expr(ty: &TypeExpr, ptr: &str) -> Result<TypeRef, ResolveError> {
    validate_qualified_name(&ty.name).map_err(|message| ResolveError {
        message,
        ptr: format!("{ptr}/name"),
    })?;

    let mut generic_args = Vec::with_capacity(ty.args.len());
    for (idx, arg) in ty.args.iter().enumerate() {
        generic_args.push(resolve_type_arg(arg, &format!("{ptr}/args/{idx}"))?);
    }

    Ok(TypeRef {
        qualified_name: ty.name.trim().to_string(),
        generic_args,
        nullable: ty.nullable,
    })
}

fn resolve_type_arg(arg: &TypeArgExpr, ptr: &str) -> Result<GenericArg, ResolveError> {
    match arg {
        TypeArgExpr::Shorthand(s) if s.trim() == "*" => Ok(GenericArg::star()),
        TypeArgExpr::Shorthand(s) => Err(ResolveError {
            message: format!("type argument shorthand must be \"*\", got {s:?}"),
            ptr: ptr.to_string(),
        }),
        TypeArgExpr::Projection {
            variance: VarianceExpr::Star,
            ty: Some(_),
        } => Err(ResolveError {
            message: "star projection must not carry a type".to_string(),
            ptr: format!("{ptr}/type"),
        }),
        TypeArgExpr::Projection {
            variance: VarianceExpr::Star,
            ty: None,
        } => Ok(GenericArg::star()),
        TypeArgExpr::Projection { variance, ty } => {
            let Some(ty) = ty else {
                return Err(ResolveError {
                    message: "type argument is missing its type".to_string(),
                    ptr: format!("{ptr}/type"),
                });
            };
            let variance = match variance {
                VarianceExpr::Invariant => Variance::Invariant,
                VarianceExpr::Out => Variance::Covariant,
                VarianceExpr::In => Variance::Contravariant,
                VarianceExpr::Star => Variance::Star,
            };
            Ok(GenericArg {
                variance,
                ty: Some(resolve_type_expr(ty, &format!("{ptr}/type"))?),
            })
        }
    }
}

/// Dotted identifier path: `kotlin.collections.List`, `Foo`.
pub fn validate_qualified_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("qualified name must be non-empty".to_string());
    }
    for seg in name.split('.') {
        if seg.is_empty() {
            return Err(format!("empty segment in qualified name: {name:?}"));
        }
        validate_identifier(seg)
            .map_err(|reason| format!("invalid segment in qualified name {name:?}: {reason}"))?;
    }
    Ok(())
}

/// Single identifier: a letter or `_`, then letters, digits or `_`.
pub fn validate_identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err("identifier must be non-empty".to_string());
    };
    if !(first.is_alphabetic() || first == '_') {
        return Err(format!(
            "invalid identifier start (must be a letter or '_'): {name:?}"
        ));
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return Err(format!(
            "invalid identifier char (allowed letters, digits, '_'): {name:?}"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(name: &str) -> TypeExpr {
        TypeExpr {
            name: name.to_string(),
            args: Vec::new(),
            nullable: false,
        }
    }

    #[test]
    fn resolves_nested_projections_in_order() {
        let ty = TypeExpr {
            name: "kotlin.collections.Map".to_string(),
            args: vec![
                TypeArgExpr::Projection {
                    variance: VarianceExpr::In,
                    ty: Some(expr("kotlin.String")),
                },
                TypeArgExpr::Shorthand("*".to_string()),
            ],
            nullable: true,
        };
        let r = resolve_type_expr(&ty, "type").expect("resolve");
        assert!(r.nullable);
        assert_eq!(r.generic_args[0].variance, Variance::Contravariant);
        assert_eq!(
            r.generic_args[0].ty.as_ref().map(|t| t.qualified_name.as_str()),
            Some("kotlin.String")
        );
        assert_eq!(r.generic_args[1], GenericArg::star());
    }

    #[test]
    fn reports_pointer_to_bad_nested_name() {
        let ty = TypeExpr {
            name: "kotlin.collections.List".to_string(),
            args: vec![TypeArgExpr::Projection {
                variance: VarianceExpr::Invariant,
                ty: Some(expr("kotlin..Int")),
            }],
            nullable: false,
        };
        let err = resolve_type_expr(&ty, "type").expect_err("must fail");
        assert_eq!(err.ptr, "type/args/0/type/name");
    }

    #[test]
    fn rejects_projection_without_type_and_star_with_type() {
        let missing = TypeExpr {
            name: "kotlin.Array".to_string(),
            args: vec![TypeArgExpr::Projection {
                variance: VarianceExpr::Out,
                ty: None,
            }],
            nullable: false,
        };
        assert!(resolve_type_expr(&missing, "type").is_err());

        let typed_star = TypeExpr {
            name: "kotlin.Array".to_string(),
            args: vec![TypeArgExpr::Projection {
                variance: VarianceExpr::Star,
                ty: Some(expr("kotlin.Int")),
            }],
            nullable: false,
        };
        assert!(resolve_type_expr(&typed_star, "type").is_err());
    }

    #[test]
    fn qualified_name_rules() {
        assert!(validate_qualified_name("kotlin.String").is_ok());
        assert!(validate_qualified_name("Foo").is_ok());
        assert!(validate_qualified_name("").is_err());
        assert!(validate_qualified_name("a.").is_err());
        assert!(validate_qualified_name("1abc").is_err());
        assert!(validate_qualified_name("List<Int>").is_err());
        assert!(validate_qualified_name(" ron.X").is_err());
        assert!(validate_qualified_name("ron.In put").is_err());
    }

    #[test]
    fn identifier_rules() {
        assert!(validate_identifier("hasChocolateChip").is_ok());
        assert!(validate_identifier("_x1").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("a.b").is_err());
        assert!(validate_identifier("Not Valid").is_err());
        assert!(validate_identifier("a: Int) = TODO()\nfun x(").is_err());
    }
}
