//! Configuration validation engine.
//!
//! Checks config files for syntax errors, unknown or misspelled fields, type
//! errors, and names the generator cannot emit into a GraphQL schema.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{env_subst::substitute_env, loader::parse_tree, schema::EngineConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "naming", "env", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "relay.node_interface"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Returns `true` if `name` matches `[_A-Za-z][_0-9A-Za-z]*`.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {},
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}

fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for &candidate in candidates {
        let d = levenshtein(needle, candidate);
        if d > 0 && d <= max_distance && best.as_ref().is_none_or(|(_, bd)| d < *bd) {
            best = Some((candidate, d));
        }
    }
    best.map(|(s, _)| s)
}

/// Validate a config file. With no path, the standard locations are searched.
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => crate::loader::find_config_file(),
    };

    let Some(ref actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Info,
                "file-ref",
                "",
                "no config file found; using defaults",
            )],
            config_path: None,
        };
    };

    match std::fs::read_to_string(actual_path) {
        Ok(content) => {
            let mut result = validate_str(&content, actual_path);
            result.config_path = Some(actual_path.clone());
            result
        },
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("failed to read config file: {e}"),
            )],
            config_path: Some(actual_path.clone()),
        },
    }
}

/// Validate config text; `path` only selects the format by its extension.
pub fn validate_str(raw: &str, path: &Path) -> ValidationResult {
    let mut diagnostics = Vec::new();

    // 1. Syntax: parse into a format-neutral tree
    let mut tree = match parse_tree(raw, path) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("syntax error: {e}"),
            ));
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };

    // 2. Environment placeholders that will stay literal
    for missing in substitute_env(&mut tree) {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "env",
            missing.path,
            format!("environment variable {} is not set", missing.variable),
        ));
    }

    // 3. Unknown fields, against the shape of the default config
    match serde_json::to_value(EngineConfig::default()) {
        Ok(known) => check_unknown_fields(&tree, &known, "", &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("cannot describe known fields: {e}"),
        )),
    }

    // 4. Types, then naming on the parsed config
    match serde_json::from_value::<EngineConfig>(tree) {
        Ok(config) => diagnostics.extend(validate_config(&config)),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        )),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_unknown_fields(
    value: &Value,
    known: &Value,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (Value::Object(table), Value::Object(fields)) = (value, known) else {
        // Leaf or type mismatch; type errors are reported after deserializing
        return;
    };
    let known_keys: Vec<&str> = fields.keys().map(String::as_str).collect();
    for (key, child_value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(child_known) = fields.get(key) {
            check_unknown_fields(child_value, child_known, &path, diagnostics);
            continue;
        }
        let level = if prefix.is_empty() {
            "at top level "
        } else {
            ""
        };
        let msg = match suggest(key, &known_keys, 3) {
            Some(s) => format!("unknown field {level}(did you mean \"{s}\"?)"),
            None => format!("unknown field {level}"),
        };
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "unknown-field",
            path,
            msg.trim(),
        ));
    }
}

/// Check that every name the generator would emit is usable in a schema.
#[must_use]
pub fn validate_config(config: &EngineConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let schema = &config.schema;
    let relay = &config.relay;

    let names = [
        ("schema.query_type", &schema.query_type),
        ("schema.mutation_type", &schema.mutation_type),
        ("schema.discriminator", &schema.discriminator),
        ("relay.node_interface", &relay.node_interface),
        ("relay.node_field", &relay.node_field),
        ("relay.id_field", &relay.id_field),
        ("relay.page_info_type", &relay.page_info_type),
    ];
    for (path, name) in names {
        if !is_valid_name(name) {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "naming",
                path,
                format!("\"{name}\" is not a valid GraphQL name"),
            ));
        } else if name.starts_with("__") {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "naming",
                path,
                format!("\"{name}\" uses the reserved \"__\" prefix"),
            ));
        }
    }

    let suffixes = [
        ("schema.input_suffix", &schema.input_suffix),
        ("relay.connection_suffix", &relay.connection_suffix),
        ("relay.edge_suffix", &relay.edge_suffix),
    ];
    for (path, suffix) in suffixes {
        if suffix.is_empty() || !suffix.chars().all(|c| c == '_' || c.is_ascii_alphanumeric()) {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "naming",
                path,
                format!("\"{suffix}\" cannot be appended to a type name"),
            ));
        }
    }

    if schema.query_type == schema.mutation_type {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "naming",
            "schema.mutation_type",
            "query and mutation root types must have different names",
        ));
    }
    if relay.connection_suffix == relay.edge_suffix {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "naming",
            "relay.edge_suffix",
            "connection and edge types would share names",
        ));
    }
    for (path, name) in [
        ("relay.node_interface", &relay.node_interface),
        ("relay.page_info_type", &relay.page_info_type),
    ] {
        if *name == schema.query_type || *name == schema.mutation_type {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "naming",
                path,
                format!("\"{name}\" collides with a root type name"),
            ));
        }
    }
    if relay.node_interface == relay.page_info_type {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "naming",
            "relay.page_info_type",
            "node interface and page info type must have different names",
        ));
    }
    if relay.id_field == schema.discriminator {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "naming",
            "schema.discriminator",
            "discriminator shadows the id field on input objects",
        ));
    }

    diagnostics
}
