//! Shapes of domain types.
//!
//! Rust has no runtime reflection, so the host describes each type it exposes
//! as a [`DomainType`] tree. Mapping strategies dispatch on the variant tag.

use std::{collections::BTreeSet, fmt, sync::Arc};

use crate::operation::OperationDescriptor;

/// Primitive and well-known value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Primitive {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
    /// Opaque identifier; the source of global object IDs.
    Id,
    Uuid,
    Url,
    DateTime,
    Decimal,
    BigInt,
    /// Arbitrary JSON passed through untouched.
    Json,
}

impl Primitive {
    /// The Rust-side spelling used in [`DomainType::key`].
    #[must_use]
    pub fn rust_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "String",
            Self::Id => "Id",
            Self::Uuid => "Uuid",
            Self::Url => "Url",
            Self::DateTime => "DateTime",
            Self::Decimal => "Decimal",
            Self::BigInt => "BigInt",
            Self::Json => "Json",
        }
    }
}

/// A domain type reference.
///
/// Anything not wrapped in [`DomainType::Optional`] is non-null in the
/// generated schema.
#[derive(Debug, Clone)]
pub enum DomainType {
    Primitive(Primitive),
    Optional(Box<DomainType>),
    List(Box<DomainType>),
    /// A cursor-paginated collection. Only meaningful as the declared result
    /// of an operation.
    Page(Box<DomainType>),
    Enum(Arc<EnumType>),
    Object(Arc<ObjectType>),
    /// A named object or enum type declared elsewhere in the graph. Used to
    /// close cycles (`User.friends: [User]`) without `Arc` loops.
    Reference(String),
}

impl DomainType {
    #[must_use]
    pub fn optional(inner: DomainType) -> Self {
        Self::Optional(Box::new(inner))
    }

    #[must_use]
    pub fn list(inner: DomainType) -> Self {
        Self::List(Box::new(inner))
    }

    #[must_use]
    pub fn page(inner: DomainType) -> Self {
        Self::Page(Box::new(inner))
    }

    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference(name.into())
    }

    /// Canonical identity of this type.
    ///
    /// Two types with the same key are the same domain type; two types that
    /// map to the same schema name but have different keys collide.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Primitive(p) => p.rust_name().to_string(),
            Self::Optional(inner) => format!("Option<{}>", inner.key()),
            Self::List(inner) => format!("Vec<{}>", inner.key()),
            Self::Page(inner) => format!("Page<{}>", inner.key()),
            Self::Enum(e) => e.qualified_name.clone(),
            Self::Object(o) => o.qualified_name.clone(),
            Self::Reference(name) => name.clone(),
        }
    }

    /// Name of a named (enum/object/reference) type.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(&e.name),
            Self::Object(o) => Some(&o.name),
            Self::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// Element type of a page, or `None` for every other shape.
    #[must_use]
    pub fn page_element(&self) -> Option<&DomainType> {
        match self {
            Self::Page(inner) => Some(inner),
            _ => None,
        }
    }

    /// `true` for object types open for subtyping.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Object(o) if o.abstract_type)
    }
}

impl From<Primitive> for DomainType {
    fn from(value: Primitive) -> Self {
        Self::Primitive(value)
    }
}

impl From<Arc<ObjectType>> for DomainType {
    fn from(value: Arc<ObjectType>) -> Self {
        Self::Object(value)
    }
}

impl From<Arc<EnumType>> for DomainType {
    fn from(value: Arc<EnumType>) -> Self {
        Self::Enum(value)
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// A closed set of named values.
#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    pub qualified_name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        Arc::new(Self {
            qualified_name: name.clone(),
            name,
            description: None,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// An object type: a named bag of operations (fields).
///
/// Abstract object types are open for subtyping and become interfaces;
/// concrete ones declare the abstract types they substitute for in
/// `implements` and inherit any field they do not redeclare.
#[derive(Debug)]
pub struct ObjectType {
    pub name: String,
    /// Identity used for collision detection; defaults to `name`.
    pub qualified_name: String,
    pub description: Option<String>,
    pub abstract_type: bool,
    pub fields: Vec<OperationDescriptor>,
    pub implements: Vec<Arc<ObjectType>>,
}

impl ObjectType {
    pub fn builder(name: impl Into<String>) -> ObjectTypeBuilder {
        let name = name.into();
        ObjectTypeBuilder {
            inner: ObjectType {
                qualified_name: name.clone(),
                name,
                description: None,
                abstract_type: false,
                fields: Vec::new(),
                implements: Vec::new(),
            },
        }
    }

    /// Declared fields followed by inherited fields not redeclared here.
    #[must_use]
    pub fn all_fields(&self) -> Vec<&OperationDescriptor> {
        let mut seen = BTreeSet::new();
        let mut fields = Vec::with_capacity(self.fields.len());
        self.collect_fields(&mut seen, &mut fields);
        fields
    }

    fn collect_fields<'a>(
        &'a self,
        seen: &mut BTreeSet<&'a str>,
        out: &mut Vec<&'a OperationDescriptor>,
    ) {
        for field in &self.fields {
            if seen.insert(field.name()) {
                out.push(field);
            }
        }
        for parent in &self.implements {
            parent.collect_fields(seen, out);
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&OperationDescriptor> {
        self.all_fields().into_iter().find(|f| f.name() == name)
    }

    /// Every abstract ancestor, nearest first, without duplicates.
    #[must_use]
    pub fn supertypes(&self) -> Vec<Arc<ObjectType>> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        let mut queue: Vec<Arc<ObjectType>> = self.implements.clone();
        while !queue.is_empty() {
            let parent = queue.remove(0);
            if seen.insert(parent.qualified_name.clone()) {
                queue.extend(parent.implements.iter().cloned());
                out.push(parent);
            }
        }
        out
    }
}

pub struct ObjectTypeBuilder {
    inner: ObjectType,
}

impl ObjectTypeBuilder {
    #[must_use]
    pub fn qualified_name(mut self, qualified_name: impl Into<String>) -> Self {
        self.inner.qualified_name = qualified_name.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = Some(description.into());
        self
    }

    /// Mark the type as open for subtyping.
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.inner.abstract_type = true;
        self
    }

    #[must_use]
    pub fn field(mut self, field: OperationDescriptor) -> Self {
        self.inner.fields.push(field);
        self
    }

    #[must_use]
    pub fn implements(mut self, parent: Arc<ObjectType>) -> Self {
        self.inner.implements.push(parent);
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<ObjectType> {
        Arc::new(self.inner)
    }
}
