use crate::schema::{Field, Schema};

/// How one target field gets its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchDecision {
    /// No same-named origin field; the caller passes the value itself.
    Direct(Field),
    /// A same-named origin field exists; the caller passes a transform from it.
    Transform {
        origin: Field,
        target: Field,
        identity_default: bool,
    },
}

impl MatchDecision {
    pub fn target_field(&self) -> &Field {
        match self {
            MatchDecision::Direct(f) => f,
            MatchDecision::Transform { target, .. } => target,
        }
    }
}

/// One decision per target field, in target field order. Never fails.
pub fn match_fields(origin: &Schema, target: &Schema) -> Vec<MatchDecision> {
    target
        .fields
        .iter()
        .map(|t| match origin.fields.iter().find(|o| o.name == t.name) {
            Some(o) => MatchDecision::Transform {
                origin: o.clone(),
                target: t.clone(),
                identity_default: o.ty.same_shallow(&t.ty),
            },
            None => MatchDecision::Direct(t.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{GenericArg, TypeRef};

    fn field(name: &str, ty: TypeRef) -> Field {
        Field {
            name: name.to_string(),
            ty,
        }
    }

    fn schema(name: &str, fields: Vec<Field>) -> Schema {
        Schema {
            qualified_name: format!("ron.{name}"),
            simple_name: name.to_string(),
            fields,
        }
    }

    #[test]
    fn decisions_follow_target_order() {
        let origin = schema(
            "In",
            vec![
                field("b", TypeRef::named("kotlin.Int")),
                field("a", TypeRef::named("kotlin.Int")),
            ],
        );
        let target = schema(
            "Out",
            vec![
                field("a", TypeRef::named("kotlin.Int")),
                field("c", TypeRef::named("kotlin.Int")),
                field("b", TypeRef::named("kotlin.Int")),
            ],
        );
        let decisions = match_fields(&origin, &target);
        let names: Vec<&str> = decisions
            .iter()
            .map(|d| d.target_field().name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "c", "b"]);
    }

    #[test]
    fn nullability_difference_disables_identity() {
        let origin = schema(
            "In",
            vec![field("crispness", TypeRef::named("kotlin.Int").nullable())],
        );
        let target = schema("Out", vec![field("crispness", TypeRef::named("kotlin.Int"))]);
        let decisions = match_fields(&origin, &target);
        assert!(matches!(
            decisions[0],
            MatchDecision::Transform {
                identity_default: false,
                ..
            }
        ));
    }

    #[test]
    fn name_difference_disables_identity() {
        let origin = schema("In", vec![field("id", TypeRef::named("kotlin.String"))]);
        let target = schema("Out", vec![field("id", TypeRef::named("java.util.UUID"))]);
        assert!(matches!(
            match_fields(&origin, &target)[0],
            MatchDecision::Transform {
                identity_default: false,
                ..
            }
        ));
    }

    #[test]
    fn generic_args_are_not_compared() {
        let list_of = |arg: &str| {
            TypeRef::named("kotlin.collections.List")
                .with_args(vec![GenericArg::invariant(TypeRef::named(arg))])
        };
        let origin = schema("In", vec![field("xs", list_of("kotlin.Int"))]);
        let target = schema("Out", vec![field("xs", list_of("kotlin.String"))]);
        assert!(matches!(
            match_fields(&origin, &target)[0],
            MatchDecision::Transform {
                identity_default: true,
                ..
            }
        ));
    }

    #[test]
    fn empty_target_yields_no_decisions() {
        let origin = schema("In", vec![field("a", TypeRef::named("kotlin.Int"))]);
        let target = schema("Out", Vec::new());
        assert!(match_fields(&origin, &target).is_empty());
    }
}
