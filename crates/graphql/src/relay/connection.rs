//! Derives `<Element>Connection`, `<Element>Edge` and `PageInfo` types for
//! paginated operations.

use std::{collections::BTreeMap, sync::Arc};

use {
    async_graphql::dynamic::TypeRef,
    schemagen_config::RelayConfig,
    schemagen_metadata::{DomainType, ObjectType, OperationDescriptor, Primitive},
};

use crate::{
    definition::ArgumentDefinition,
    error::{ConfigurationError, Result},
};

/// Remembers which element type each derived connection name belongs to, so
/// that two distinct element types never share one connection.
#[derive(Debug)]
pub struct ConnectionBuilder {
    config: RelayConfig,
    /// Element identity per element name; `None` while only by-name
    /// references have asked for it.
    elements: BTreeMap<String, Option<String>>,
    connections: BTreeMap<String, Arc<ObjectType>>,
    page_info: Arc<ObjectType>,
}

/// A reference names the schema type itself, so it is compatible with
/// whichever domain type owns that name.
fn element_identity(element: &DomainType) -> Option<String> {
    match element {
        DomainType::Reference(_) => None,
        other => Some(other.key()),
    }
}

impl ConnectionBuilder {
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        let page_info = ObjectType::builder(config.page_info_type.clone())
            .qualified_name(format!("relay::{}", config.page_info_type))
            .description("Information about pagination in a connection")
            .field(
                OperationDescriptor::new("hasNextPage", Primitive::Bool)
                    .description("When paginating forwards, are there more items?"),
            )
            .field(
                OperationDescriptor::new("hasPreviousPage", Primitive::Bool)
                    .description("When paginating backwards, are there more items?"),
            )
            .field(
                OperationDescriptor::new(
                    "startCursor",
                    DomainType::optional(Primitive::String.into()),
                )
                .description("When paginating backwards, the cursor to continue"),
            )
            .field(
                OperationDescriptor::new("endCursor", DomainType::optional(Primitive::String.into()))
                    .description("When paginating forwards, the cursor to continue"),
            )
            .build();
        Self {
            config,
            elements: BTreeMap::new(),
            connections: BTreeMap::new(),
            page_info,
        }
    }

    /// The synthetic connection object for `element`, whose schema type is
    /// named `element_name`.
    ///
    /// The returned domain type is mapped like any other object; its fields
    /// read the `edges`/`pageInfo` shape of [`Page`](super::Page).
    pub fn connection_type(
        &mut self,
        element: &DomainType,
        element_name: &str,
    ) -> Result<Arc<ObjectType>> {
        let identity = element_identity(element);
        let connection_name = format!("{element_name}{}", self.config.connection_suffix);
        if let Some(existing) = self.elements.get_mut(element_name) {
            match (existing.clone(), identity.clone()) {
                (Some(known), Some(incoming)) if known != incoming => {
                    return Err(ConfigurationError::ConnectionCollision {
                        type_name: connection_name,
                        existing: known,
                        incoming,
                    }
                    .into());
                },
                (None, Some(incoming)) => *existing = Some(incoming),
                _ => {},
            }
            if let Some(connection) = self.connections.get(element_name) {
                return Ok(Arc::clone(connection));
            }
        }

        let key = element.key();

        let edge = ObjectType::builder(format!("{element_name}{}", self.config.edge_suffix))
            .qualified_name(format!("relay::Edge<{key}>"))
            .description(format!("An edge in a connection of {element_name}"))
            .field(
                OperationDescriptor::new("node", element.clone())
                    .description("The item at the end of the edge"),
            )
            .field(
                OperationDescriptor::new("cursor", Primitive::String)
                    .description("A cursor for use in pagination"),
            )
            .build();
        let connection = ObjectType::builder(connection_name)
            .qualified_name(format!("relay::Connection<{key}>"))
            .description(format!("A paginated list of {element_name}"))
            .field(OperationDescriptor::new(
                "edges",
                DomainType::list(DomainType::Object(edge)),
            ))
            .field(OperationDescriptor::new(
                "pageInfo",
                DomainType::Object(Arc::clone(&self.page_info)),
            ))
            .build();

        self.elements.insert(element_name.to_string(), identity);
        self.connections
            .insert(element_name.to_string(), Arc::clone(&connection));
        Ok(connection)
    }
}

/// Arguments every connection field accepts, in order.
#[must_use]
pub fn pagination_arguments() -> Vec<ArgumentDefinition> {
    vec![
        ArgumentDefinition::new("first", TypeRef::named(TypeRef::INT))
            .description("Returns the first n elements from the list"),
        ArgumentDefinition::new("after", TypeRef::named(TypeRef::STRING))
            .description("Returns the elements that come after the specified cursor"),
        ArgumentDefinition::new("last", TypeRef::named(TypeRef::INT))
            .description("Returns the last n elements from the list"),
        ArgumentDefinition::new("before", TypeRef::named(TypeRef::STRING))
            .description("Returns the elements that come before the specified cursor"),
    ]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {super::*, crate::Error};

    fn user(qualified: &str) -> DomainType {
        ObjectType::builder("User")
            .qualified_name(qualified)
            .field(OperationDescriptor::new("name", Primitive::String))
            .build()
            .into()
    }

    #[test]
    fn derives_names_from_element() {
        let mut builder = ConnectionBuilder::new(RelayConfig::default());
        let connection = builder.connection_type(&user("app::User"), "User").unwrap();
        assert_eq!(connection.name, "UserConnection");

        let fields: Vec<_> = connection.fields.iter().map(|f| f.name()).collect();
        assert_eq!(fields, ["edges", "pageInfo"]);

        let DomainType::List(edges) = connection.fields[0].result_type() else {
            panic!("edges must be a list");
        };
        assert_eq!(edges.name(), Some("UserEdge"));
    }

    #[test]
    fn same_element_reuses_connection() {
        let mut builder = ConnectionBuilder::new(RelayConfig::default());
        let a = builder.connection_type(&user("app::User"), "User").unwrap();
        let b = builder.connection_type(&user("app::User"), "User").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn distinct_elements_with_one_name_collide() {
        let mut builder = ConnectionBuilder::new(RelayConfig::default());
        builder.connection_type(&user("app::User"), "User").unwrap();
        let err = builder
            .connection_type(&user("legacy::User"), "User")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::ConnectionCollision { ref type_name, .. })
                if type_name == "UserConnection"
        ));
    }

    #[test]
    fn references_share_the_connection_of_their_target() {
        let mut builder = ConnectionBuilder::new(RelayConfig::default());
        let by_type = builder.connection_type(&user("app::User"), "User").unwrap();
        let by_name = builder
            .connection_type(&DomainType::reference("User"), "User")
            .unwrap();
        assert!(Arc::ptr_eq(&by_type, &by_name));

        // Reference first, then the object it names, then a stranger.
        let mut builder = ConnectionBuilder::new(RelayConfig::default());
        let by_name = builder
            .connection_type(&DomainType::reference("User"), "User")
            .unwrap();
        let by_type = builder.connection_type(&user("app::User"), "User").unwrap();
        assert!(Arc::ptr_eq(&by_type, &by_name));
        assert!(builder.connection_type(&user("legacy::User"), "User").is_err());
    }

    #[test]
    fn suffixes_follow_config() {
        let config = RelayConfig {
            connection_suffix: "Page".into(),
            edge_suffix: "Link".into(),
            ..RelayConfig::default()
        };
        let mut builder = ConnectionBuilder::new(config);
        let connection = builder.connection_type(&user("app::User"), "User").unwrap();
        assert_eq!(connection.name, "UserPage");
        let DomainType::List(edges) = connection.fields[0].result_type() else {
            panic!("edges must be a list");
        };
        assert_eq!(edges.name(), Some("UserLink"));
    }

    #[test]
    fn pagination_arguments_are_fixed() {
        let names: Vec<_> = pagination_arguments().into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["first", "after", "last", "before"]);
    }
}
