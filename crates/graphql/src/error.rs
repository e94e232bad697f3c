//! Error taxonomy for schema assembly and resolver invocation.
//!
//! [`ConfigurationError`]s abort schema construction. [`DecodeError`]s and
//! [`LookupError`]s only ever fail the single field being resolved.

use {async_graphql::ErrorExtensions, thiserror::Error};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("operation '{operation}' failed: {source}")]
    Invocation {
        operation: String,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    #[must_use]
    pub fn invocation(operation: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Invocation {
            operation: operation.into(),
            source,
        }
    }

    /// Machine-readable code attached to GraphQL errors as `extensions.code`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Decode(_) => "BAD_USER_INPUT",
            Self::Lookup(_) => "NOT_FOUND",
            Self::Invocation { .. } => "INTERNAL_ERROR",
        }
    }
}

/// Fatal inconsistencies found while assembling a schema.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no type mapper supports domain type {domain_type}")]
    UnmappedType { domain_type: String },

    #[error("schema type name {type_name} is produced by both {existing} and {incoming}")]
    TypeNameCollision {
        type_name: String,
        existing: String,
        incoming: String,
    },

    #[error("connection type {type_name} would be derived from both {existing} and {incoming}")]
    ConnectionCollision {
        type_name: String,
        existing: String,
        incoming: String,
    },

    #[error("operation '{operation}' returns an ID but has no enclosing type to encode it against")]
    MissingEnclosingType { operation: String },

    #[error("abstract type {type_name} has no concrete implementations")]
    NoImplementations { type_name: String },

    #[error("type reference {name} does not name a registered type")]
    UnresolvedReference { name: String },

    #[error("schema validation failed: {message}")]
    Schema { message: String },
}

impl ConfigurationError {
    #[must_use]
    pub fn unmapped(domain_type: impl ToString) -> Self {
        Self::UnmappedType {
            domain_type: domain_type.to_string(),
        }
    }

    #[must_use]
    pub fn missing_enclosing_type(operation: impl Into<String>) -> Self {
        Self::MissingEnclosingType {
            operation: operation.into(),
        }
    }

    #[must_use]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }
}

/// Request input that cannot be turned into domain values.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{input} is not a valid global ID: {reason}")]
    MalformedGlobalId { input: String, reason: String },

    #[error("invalid value for argument '{path}': {message}")]
    InvalidArgument { path: String, message: String },

    #[error("{type_name} is not a known implementation of {abstract_type}")]
    UnknownImplementation {
        abstract_type: String,
        type_name: String,
    },

    #[error("value of abstract type {type_name} is missing its '{discriminator}' field")]
    MissingDiscriminator {
        type_name: String,
        discriminator: String,
    },

    #[error("cannot serialize raw id: {reason}")]
    UnserializableId { reason: String },

    #[error("invalid pagination arguments: {message}")]
    InvalidPagination { message: String },
}

impl DecodeError {
    #[must_use]
    pub fn malformed_id(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedGlobalId {
            input: input.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid_argument(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            path: path.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unserializable_id(reason: impl Into<String>) -> Self {
        Self::UnserializableId {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid_pagination(message: impl Into<String>) -> Self {
        Self::InvalidPagination {
            message: message.into(),
        }
    }
}

/// Failures of the fetch-by-global-ID field.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{type_name} is not a known type")]
    UnknownType { type_name: String },

    #[error("query '{operation}' has no primary resolver")]
    NoPrimaryResolver { operation: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Convert an engine error into an `async_graphql::Error` with a `code`
/// extension.
pub fn gql_err(err: impl Into<Error>) -> async_graphql::Error {
    let err = err.into();
    let code = err.code();
    async_graphql::Error::new(err.to_string()).extend_with(|_, ext| ext.set("code", code))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn lookup_messages_name_the_culprit() {
        let err = Error::from(LookupError::UnknownType {
            type_name: "Ghost".into(),
        });
        assert_eq!(err.to_string(), "Ghost is not a known type");

        let err = Error::from(LookupError::NoPrimaryResolver {
            operation: "user".into(),
        });
        assert_eq!(err.to_string(), "query 'user' has no primary resolver");
    }

    #[test]
    fn gql_err_carries_code_extension() {
        let err = gql_err(DecodeError::malformed_id("xyz", "not base64"));
        assert!(err.message.contains("xyz is not a valid global ID"));
        let ext = err.extensions.expect("extensions");
        assert_eq!(
            ext.get("code"),
            Some(&async_graphql::Value::String("BAD_USER_INPUT".into()))
        );
    }
}
