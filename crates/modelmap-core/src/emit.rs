use crate::matcher::MatchDecision;
use crate::render::{render_type, RenderOptions};
use crate::schema::MappingSpec;

/// Default value used for transforms between identical types.
pub const IDENTITY_TRANSFORM: &str = "{ it }";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// Value passed through to the constructor unchanged.
    Value { ty: String },
    /// `(from) -> to`, applied to the origin field of the same name.
    Transform {
        from: String,
        to: String,
        identity_default: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn rendered_type(&self) -> String {
        match &self.kind {
            ParameterKind::Value { ty } => ty.clone(),
            ParameterKind::Transform { from, to, .. } => format!("({from}) -> {to}"),
        }
    }

    pub fn default_value(&self) -> Option<&'static str> {
        match self.kind {
            ParameterKind::Transform {
                identity_default: true,
                ..
            } => Some(IDENTITY_TRANSFORM),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorArg {
    pub field: String,
    pub value: String,
}

/// A mapping function ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFunction {
    pub name: String,
    /// Origin type the function is attached to.
    pub receiver: String,
    pub parameters: Vec<Parameter>,
    /// Target type; also the constructor being called.
    pub return_type: String,
    pub constructor_args: Vec<ConstructorArg>,
}

impl GeneratedFunction {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

pub fn function_name(spec: &MappingSpec) -> String {
    format!("mapTo{}", spec.target.simple_name)
}

pub fn emit_function(
    spec: &MappingSpec,
    decisions: &[MatchDecision],
    opts: RenderOptions,
) -> GeneratedFunction {
    let mut parameters = Vec::with_capacity(decisions.len());
    let mut constructor_args = Vec::with_capacity(decisions.len());

    for decision in decisions {
        match decision {
            MatchDecision::Direct(t) => {
                parameters.push(Parameter {
                    name: t.name.clone(),
                    kind: ParameterKind::Value {
                        ty: render_type(&t.ty, opts),
                    },
                });
                constructor_args.push(ConstructorArg {
                    field: t.name.clone(),
                    value: t.name.clone(),
                });
            }
            MatchDecision::Transform {
                origin,
                target,
                identity_default,
            } => {
                parameters.push(Parameter {
                    name: target.name.clone(),
                    kind: ParameterKind::Transform {
                        from: render_type(&origin.ty, opts),
                        to: render_type(&target.ty, opts),
                        identity_default: *identity_default,
                    },
                });
                constructor_args.push(ConstructorArg {
                    field: target.name.clone(),
                    value: format!("{}(this.{})", target.name, origin.name),
                });
            }
        }
    }

    GeneratedFunction {
        name: function_name(spec),
        receiver: spec.origin.qualified_name.clone(),
        parameters,
        return_type: spec.target.qualified_name.clone(),
        constructor_args,
    }
}

pub fn write_file_header(package: &str) -> String {
    format!("package {package}\n\n")
}

/// Serializes one function, followed by a blank line.
pub fn write_function(f: &GeneratedFunction) -> String {
    let mut out = String::new();
    out.push_str(&format!("inline fun {}.{}(\n", f.receiver, f.name));
    for p in &f.parameters {
        out.push_str(&format!("    {}: {}", p.name, p.rendered_type()));
        if let Some(default) = p.default_value() {
            out.push_str(" = ");
            out.push_str(default);
        }
        out.push_str(",\n");
    }
    out.push_str(&format!(") = {}(\n", f.return_type));
    for arg in &f.constructor_args {
        out.push_str(&format!("    {} = {},\n", arg.field, arg.value));
    }
    out.push_str(")\n\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::match_fields;
    use crate::schema::{Field, GenericArg, Schema, TypeRef};

    fn field(name: &str, ty: TypeRef) -> Field {
        Field {
            name: name.to_string(),
            ty,
        }
    }

    fn spec(origin: Vec<Field>, target: Vec<Field>) -> MappingSpec {
        MappingSpec {
            origin: Schema {
                qualified_name: "ron.Input".to_string(),
                simple_name: "Input".to_string(),
                fields: origin,
            },
            target: Schema {
                qualified_name: "ron.Cmd".to_string(),
                simple_name: "Cmd".to_string(),
                fields: target,
            },
        }
    }

    #[test]
    fn writes_direct_and_transform_parameters() {
        let s = spec(
            vec![
                field("color", TypeRef::named("kotlin.String")),
                field("crispness", TypeRef::named("kotlin.Int").nullable()),
            ],
            vec![
                field("owner", TypeRef::named("kotlin.String")),
                field("color", TypeRef::named("kotlin.String")),
                field("crispness", TypeRef::named("kotlin.Int")),
            ],
        );
        let f = emit_function(&s, &match_fields(&s.origin, &s.target), RenderOptions::default());
        assert_eq!(
            write_function(&f),
            "inline fun ron.Input.mapToCmd(\n\
             \x20   owner: kotlin.String,\n\
             \x20   color: (kotlin.String) -> kotlin.String = { it },\n\
             \x20   crispness: (kotlin.Int?) -> kotlin.Int,\n\
             ) = ron.Cmd(\n\
             \x20   owner = owner,\n\
             \x20   color = color(this.color),\n\
             \x20   crispness = crispness(this.crispness),\n\
             )\n\n"
        );
    }

    #[test]
    fn empty_target_writes_empty_lists() {
        let s = spec(vec![field("a", TypeRef::named("kotlin.Int"))], Vec::new());
        let f = emit_function(&s, &match_fields(&s.origin, &s.target), RenderOptions::default());
        assert_eq!(
            write_function(&f),
            "inline fun ron.Input.mapToCmd(\n) = ron.Cmd(\n)\n\n"
        );
    }

    #[test]
    fn erasure_applies_to_transform_types() {
        let list = TypeRef::named("kotlin.collections.List")
            .with_args(vec![GenericArg::covariant(TypeRef::named("kotlin.String"))]);
        let s = spec(vec![field("tags", list.clone())], vec![field("tags", list)]);
        let f = emit_function(
            &s,
            &match_fields(&s.origin, &s.target),
            RenderOptions {
                erase_generics: true,
            },
        );
        let p = f.parameter("tags").expect("tags param");
        assert_eq!(
            p.rendered_type(),
            "(kotlin.collections.List<*>) -> kotlin.collections.List<*>"
        );
        assert_eq!(p.default_value(), Some(IDENTITY_TRANSFORM));
    }

    #[test]
    fn header_is_a_single_package_line() {
        assert_eq!(write_file_header("ron"), "package ron\n\n");
    }
}
