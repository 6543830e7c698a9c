//! Shared, version-pinned protocol identifiers.
//!
//! These constants are the single source of truth for schema/version strings that
//! appear in machine-readable I/O.

pub const DECLARATIONS_SCHEMA_VERSION: &str = "modelmap.declarations@0.1.0";
pub const RUN_REPORT_SCHEMA_VERSION: &str = "modelmap.report@0.1.0";

/// Tool name recorded in reports.
pub const GENERATED_BY: &str = "modelmap";
