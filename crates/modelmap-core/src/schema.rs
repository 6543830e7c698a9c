use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
    Star,
}

impl Variance {
    /// Keyword printed in front of a projected argument, if any.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Variance::Covariant => Some("out"),
            Variance::Contravariant => Some("in"),
            Variance::Invariant | Variance::Star => None,
        }
    }
}

/// A resolved type reference.
///
/// Argument order is declaration order and is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub qualified_name: String,
    pub generic_args: Vec<GenericArg>,
    pub nullable: bool,
}

impl TypeRef {
    pub fn named(qualified_name: impl Into<String>) -> Self {
        TypeRef {
            qualified_name: qualified_name.into(),
            generic_args: Vec::new(),
            nullable: false,
        }
    }

    pub fn with_args(mut self, args: Vec<GenericArg>) -> Self {
        self.generic_args = args;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Shallow equality used to decide whether a transform may default to identity.
    ///
    /// Only the qualified name and nullability take part; generic arguments are not
    /// compared, so `List<Int>` and `List<String>` count as the same type here.
    pub fn same_shallow(&self, other: &TypeRef) -> bool {
        self.qualified_name == other.qualified_name && self.nullable == other.nullable
    }
}

/// One generic argument. `ty` is `None` exactly when `variance` is `Star`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericArg {
    pub variance: Variance,
    pub ty: Option<TypeRef>,
}

impl GenericArg {
    pub fn star() -> Self {
        GenericArg {
            variance: Variance::Star,
            ty: None,
        }
    }

    pub fn invariant(ty: TypeRef) -> Self {
        GenericArg {
            variance: Variance::Invariant,
            ty: Some(ty),
        }
    }

    pub fn covariant(ty: TypeRef) -> Self {
        GenericArg {
            variance: Variance::Covariant,
            ty: Some(ty),
        }
    }

    pub fn contravariant(ty: TypeRef) -> Self {
        GenericArg {
            variance: Variance::Contravariant,
            ty: Some(ty),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
}

/// A validated, plain, non-generic record declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub qualified_name: String,
    pub simple_name: String,
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One (origin, target) pair, produced per marker on an origin declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSpec {
    pub origin: Schema,
    pub target: Schema,
}
