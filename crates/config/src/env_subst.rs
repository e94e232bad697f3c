//! `${VAR}` expansion inside the string values of a parsed config tree.
//!
//! Expansion runs after parsing, so a variable's value can never change the
//! structure of the file. Keys are left alone.

use serde_json::Value;

/// A placeholder whose variable was not set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    /// Dotted path of the config value, e.g. `relay.node_interface`.
    pub path: String,
    pub variable: String,
}

/// Expand placeholders in every string of `tree` from the process
/// environment. Unset variables stay as written and are returned.
pub fn substitute_env(tree: &mut Value) -> Vec<Unresolved> {
    substitute_with(tree, &|name| std::env::var(name).ok())
}

pub(crate) fn substitute_with(
    tree: &mut Value,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Vec<Unresolved> {
    let mut unresolved = Vec::new();
    walk(tree, String::new(), lookup, &mut unresolved);
    unresolved
}

fn walk(
    value: &mut Value,
    path: String,
    lookup: &dyn Fn(&str) -> Option<String>,
    unresolved: &mut Vec<Unresolved>,
) {
    match value {
        Value::String(text) => {
            let mut missing = Vec::new();
            *text = expand(text, lookup, &mut missing);
            unresolved.extend(missing.into_iter().map(|variable| Unresolved {
                path: path.clone(),
                variable,
            }));
        },
        Value::Array(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                walk(item, format!("{path}[{index}]"), lookup, unresolved);
            }
        },
        Value::Object(table) => {
            for (key, child) in table.iter_mut() {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(child, child_path, lookup, unresolved);
            }
        },
        Value::Null | Value::Bool(_) | Value::Number(_) => {},
    }
}

/// Expand one string. An unterminated `${` is copied through literally.
fn expand(
    input: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
    missing: &mut Vec<String>,
) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match lookup(name) {
            Some(value) if !name.is_empty() => out.push_str(&value),
            _ => {
                if !name.is_empty() {
                    missing.push(name.to_string());
                }
                out.push_str(&rest[start..start + 2 + end + 1]);
            },
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn env(name: &str) -> Option<String> {
        match name {
            "SCHEMAGEN_ROOT" => Some("RootQuery".to_string()),
            "SCHEMAGEN_QUOTE" => Some("a\"b".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_nested_strings_only() {
        let mut tree = json!({
            "schema": { "query_type": "${SCHEMAGEN_ROOT}", "depth": 3 },
            "${SCHEMAGEN_ROOT}": "key stays",
        });
        let unresolved = substitute_with(&mut tree, &env);
        assert!(unresolved.is_empty());
        assert_eq!(tree["schema"]["query_type"], "RootQuery");
        assert_eq!(tree["schema"]["depth"], 3);
        assert_eq!(tree["${SCHEMAGEN_ROOT}"], "key stays");
    }

    #[test]
    fn values_cannot_break_out_of_their_string() {
        let mut tree = json!({ "schema": { "discriminator": "x${SCHEMAGEN_QUOTE}y" } });
        substitute_with(&mut tree, &env);
        assert_eq!(tree["schema"]["discriminator"], "xa\"by");
    }

    #[test]
    fn reports_unset_variables_with_their_path() {
        let mut tree = json!({
            "relay": { "edge_suffix": "${SCHEMAGEN_MISSING}${SCHEMAGEN_ROOT}" },
            "list": ["${SCHEMAGEN_GONE}"],
        });
        let mut unresolved = substitute_with(&mut tree, &env);
        unresolved.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(tree["relay"]["edge_suffix"], "${SCHEMAGEN_MISSING}RootQuery");
        assert_eq!(unresolved, [
            Unresolved {
                path: "list[0]".into(),
                variable: "SCHEMAGEN_GONE".into(),
            },
            Unresolved {
                path: "relay.edge_suffix".into(),
                variable: "SCHEMAGEN_MISSING".into(),
            },
        ]);
    }

    #[test]
    fn malformed_placeholders_are_literal() {
        let mut missing = Vec::new();
        assert_eq!(expand("a${}b", &env, &mut missing), "a${}b");
        assert_eq!(expand("tail ${SCHEMAGEN_ROOT", &env, &mut missing), "tail ${SCHEMAGEN_ROOT");
        assert_eq!(expand("$ {x} $$", &env, &mut missing), "$ {x} $$");
        assert!(missing.is_empty());
    }
}
