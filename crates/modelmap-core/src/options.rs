use serde::{Deserialize, Serialize};

use crate::render::RenderOptions;
use crate::resolve::validate_qualified_name;
use crate::sink::validate_file_name;

pub const DEFAULT_PACKAGE: &str = "ron";
pub const DEFAULT_FILE_NAME: &str = "GeneratedMapperFunctions";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("option must be key=value, got {0:?}")]
    Malformed(String),
    #[error("option {key} expects true or false, got {value:?}")]
    InvalidBool { key: String, value: String },
    #[error("invalid package {package:?}: {reason}")]
    InvalidPackage { package: String, reason: String },
    #[error("option {0} must not be empty")]
    Empty(String),
    #[error("invalid fileName {file_name:?}: {reason}")]
    InvalidFileName { file_name: String, reason: String },
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub package: String,
    pub file_name: String,
    pub erase_generics: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            package: DEFAULT_PACKAGE.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            erase_generics: false,
        }
    }
}

impl GenerateOptions {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            erase_generics: self.erase_generics,
        }
    }

    /// Applies annotation-processor style `key=value` options.
    ///
    /// `ignoreGenericArgs` is the key used by existing build scripts; `eraseGenerics`
    /// is accepted as an alias. Unknown keys are logged and ignored.
    pub fn apply_processor_options<'a, I>(&mut self, options: I) -> Result<(), OptionsError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in options {
            match key {
                "ignoreGenericArgs" | "eraseGenerics" => {
                    self.erase_generics = parse_bool(key, value)?;
                }
                "package" => self.set_package(value)?,
                "fileName" => self.set_file_name(value)?,
                other => tracing::warn!(option = other, "ignoring unknown processor option"),
            }
        }
        Ok(())
    }

    pub fn set_package(&mut self, package: &str) -> Result<(), OptionsError> {
        let package = package.trim();
        validate_qualified_name(package).map_err(|reason| OptionsError::InvalidPackage {
            package: package.to_string(),
            reason,
        })?;
        self.package = package.to_string();
        Ok(())
    }

    /// Sets the output file's base name; the `.kt` extension is added on write.
    pub fn set_file_name(&mut self, file_name: &str) -> Result<(), OptionsError> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(OptionsError::Empty("fileName".to_string()));
        }
        validate_file_name(file_name).map_err(|reason| OptionsError::InvalidFileName {
            file_name: file_name.to_string(),
            reason,
        })?;
        self.file_name = file_name.to_string();
        Ok(())
    }
}

pub fn parse_key_value(raw: &str) -> Result<(String, String), OptionsError> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(OptionsError::Malformed(raw.to_string()));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(OptionsError::Malformed(raw.to_string()));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, OptionsError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(OptionsError::InvalidBool {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}
