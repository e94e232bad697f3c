//! Configuration loading and validation for the schema generator.
//!
//! Config files: `schemagen.toml`, `schemagen.yaml` or `schemagen.json`,
//! searched in `./` then `~/.config/schemagen/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{config_dir, discover_and_load, find_config_file, load_config, parse_config},
    schema::{EngineConfig, IdSerializerKind, RelayConfig, SchemaConfig},
    validate::{Diagnostic, Severity, ValidationResult, is_valid_name, validate, validate_config, validate_str},
};
