//! Named schema types registered during assembly.

use std::collections::{BTreeMap, BTreeSet};

use {
    async_graphql::indexmap::IndexMap,
    schemagen_metadata::DomainType,
    tracing::debug,
};

use crate::{
    accumulator::AbstractTypes,
    definition::TypeDefinition,
    error::{ConfigurationError, Result},
    scalars::ScalarKind,
};

/// Outcome of claiming a schema type name.
#[derive(Debug)]
pub enum Claim {
    /// First request for this name; the caller must build and
    /// [`complete`](TypeRegistry::complete) it.
    New,
    /// Already registered, or being built further up the stack. Carries the
    /// abstract types reachable from it, as far as they are known.
    Existing(AbstractTypes),
}

#[derive(Debug)]
struct Entry {
    key: String,
    definition: Option<TypeDefinition>,
    abstract_types: AbstractTypes,
}

/// Insertion-ordered registry of every named type in the schema, keyed by
/// schema name and tagged with the identity of the domain type behind it.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, Entry>,
    domain_types: BTreeMap<String, DomainType>,
    implementations: BTreeMap<String, BTreeSet<String>>,
    node_types: BTreeSet<String>,
    scalars: BTreeSet<ScalarKind>,
    deferred_references: BTreeSet<String>,
}

/// Everything the schema builder needs from the registry.
#[derive(Debug, Default)]
pub struct RegisteredTypes {
    pub definitions: Vec<TypeDefinition>,
    pub implementations: BTreeMap<String, BTreeSet<String>>,
    pub domain_types: BTreeMap<String, DomainType>,
    pub node_types: BTreeSet<String>,
    pub scalars: BTreeSet<ScalarKind>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name` for the domain type identified by `key`.
    pub fn claim(&mut self, name: &str, key: &str) -> Result<Claim> {
        if let Some(entry) = self.types.get(name) {
            if entry.key != key {
                return Err(ConfigurationError::TypeNameCollision {
                    type_name: name.to_string(),
                    existing: entry.key.clone(),
                    incoming: key.to_string(),
                }
                .into());
            }
            return Ok(Claim::Existing(entry.abstract_types.clone()));
        }
        self.types.insert(name.to_string(), Entry {
            key: key.to_string(),
            definition: None,
            abstract_types: AbstractTypes::new(),
        });
        Ok(Claim::New)
    }

    /// Store the finished definition of a previously claimed name.
    pub fn complete(&mut self, definition: TypeDefinition, abstract_types: AbstractTypes) {
        let name = definition.name().to_string();
        debug!(type_name = %name, "registered schema type");
        if let Some(entry) = self.types.get_mut(&name) {
            entry.definition = Some(definition);
            entry.abstract_types = abstract_types;
        }
    }

    /// Remember which domain type an output type name stands for.
    pub fn record_domain(&mut self, name: &str, ty: &DomainType) {
        self.domain_types
            .entry(name.to_string())
            .or_insert_with(|| ty.clone());
    }

    #[must_use]
    pub fn domain_type(&self, name: &str) -> Option<&DomainType> {
        self.domain_types.get(name)
    }

    /// Record `concrete` as an implementation of `abstract_type`.
    pub fn add_implementation(&mut self, abstract_type: &str, concrete: &str) {
        self.implementations
            .entry(abstract_type.to_string())
            .or_default()
            .insert(concrete.to_string());
    }

    pub fn implementations(&self, abstract_type: &str) -> impl Iterator<Item = &str> {
        self.implementations
            .get(abstract_type)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn mark_node(&mut self, name: &str) {
        self.node_types.insert(name.to_string());
    }

    #[must_use]
    pub fn is_node(&self, name: &str) -> bool {
        self.node_types.contains(name)
    }

    pub fn use_scalar(&mut self, kind: ScalarKind) {
        self.scalars.insert(kind);
    }

    /// A reference to a type that has not been mapped yet; it must be by the
    /// time assembly finishes.
    pub fn defer_reference(&mut self, name: &str) {
        self.deferred_references.insert(name.to_string());
    }

    /// First deferred reference that never got registered.
    #[must_use]
    pub fn unresolved_reference(&self) -> Option<&str> {
        self.deferred_references
            .iter()
            .find(|name| !self.domain_types.contains_key(name.as_str()))
            .map(String::as_str)
    }

    /// Deferred references whose target turned out to be abstract.
    pub fn deferred_abstract_types(&self) -> impl Iterator<Item = &str> {
        self.deferred_references
            .iter()
            .filter(|name| {
                matches!(
                    self.domain_types.get(name.as_str()),
                    Some(DomainType::Object(object)) if object.abstract_type
                )
            })
            .map(String::as_str)
    }

    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)?.definition.as_ref()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    #[must_use]
    pub fn into_parts(self) -> RegisteredTypes {
        RegisteredTypes {
            definitions: self
                .types
                .into_values()
                .filter_map(|entry| entry.definition)
                .collect(),
            implementations: self.implementations,
            domain_types: self.domain_types,
            node_types: self.node_types,
            scalars: self.scalars,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {
        super::*,
        crate::{Error, definition::EnumDefinition},
    };

    fn color() -> TypeDefinition {
        TypeDefinition::Enum(EnumDefinition {
            name: "Color".into(),
            description: None,
            values: vec!["RED".into()],
        })
    }

    #[test]
    fn same_key_reuses_and_other_key_collides() {
        let mut registry = TypeRegistry::new();
        assert!(matches!(registry.claim("Color", "paint::Color"), Ok(Claim::New)));
        registry.complete(color(), ["Shade"].into_iter().collect());

        match registry.claim("Color", "paint::Color").unwrap() {
            Claim::Existing(reachable) => assert!(reachable.contains("Shade")),
            Claim::New => panic!("expected existing"),
        }

        let err = registry.claim("Color", "light::Color").unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::TypeNameCollision { ref existing, .. })
                if existing == "paint::Color"
        ));
    }

    #[test]
    fn in_progress_types_are_not_exported() {
        let mut registry = TypeRegistry::new();
        registry.claim("Pending", "Pending").unwrap();
        registry.claim("Color", "Color").unwrap();
        registry.complete(color(), AbstractTypes::new());

        let parts = registry.into_parts();
        let names: Vec<_> = parts.definitions.iter().map(TypeDefinition::name).collect();
        assert_eq!(names, ["Color"]);
    }

    #[test]
    fn deferred_references_resolve_once_recorded() {
        let mut registry = TypeRegistry::new();
        registry.defer_reference("User");
        assert_eq!(registry.unresolved_reference(), Some("User"));
        registry.record_domain("User", &DomainType::reference("User"));
        assert_eq!(registry.unresolved_reference(), None);
    }
}
