//! Generates mapping functions between record declarations.
//!
//! Given an origin and a target data class, each generated function takes one parameter
//! per target field. Fields the origin also has become transforms from the origin value,
//! defaulting to identity when the two types match. The rest are passed in directly.

pub mod decl;
pub mod diagnostics;
pub mod emit;
pub mod matcher;
pub mod options;
pub mod process;
pub mod render;
pub mod resolve;
pub mod schema;
pub mod sink;
pub mod validate;

mod util;

pub use decl::{parse_manifest_json, DeclarationSet};
pub use options::GenerateOptions;
pub use process::{process, RunError, RunReport};
pub use resolve::ManifestResolver;
