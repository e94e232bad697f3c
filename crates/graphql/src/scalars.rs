//! Scalar registry: which schema scalar each primitive domain type becomes,
//! plus the custom scalar definitions and value conversions.

use {
    async_graphql::{Name, Number, Value, dynamic::Scalar, indexmap::IndexMap},
    schemagen_metadata::{DomainType, Primitive},
};

#[derive(Debug, thiserror::Error)]
pub enum ScalarError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("unsupported value type")]
    UnsupportedValueType,
}

/// A schema scalar, built in or custom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    Boolean,
    Int,
    Long,
    Float,
    Char,
    String,
    Id,
    Uuid,
    Uri,
    DateTime,
    BigDecimal,
    BigInteger,
    Json,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 13] = [
        Self::Boolean,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Char,
        Self::String,
        Self::Id,
        Self::Uuid,
        Self::Uri,
        Self::DateTime,
        Self::BigDecimal,
        Self::BigInteger,
        Self::Json,
    ];

    #[must_use]
    pub fn of(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Bool => Self::Boolean,
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::U8 | Primitive::U16 => {
                Self::Int
            },
            Primitive::I64 | Primitive::U32 | Primitive::U64 => Self::Long,
            Primitive::F32 | Primitive::F64 => Self::Float,
            Primitive::Char => Self::Char,
            Primitive::String => Self::String,
            Primitive::Id => Self::Id,
            Primitive::Uuid => Self::Uuid,
            Primitive::Url => Self::Uri,
            Primitive::DateTime => Self::DateTime,
            Primitive::Decimal => Self::BigDecimal,
            Primitive::BigInt => Self::BigInteger,
            Primitive::Json => Self::Json,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Int => "Int",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Char => "Char",
            Self::String => "String",
            Self::Id => "ID",
            Self::Uuid => "UUID",
            Self::Uri => "URI",
            Self::DateTime => "DateTime",
            Self::BigDecimal => "BigDecimal",
            Self::BigInteger => "BigInteger",
            Self::Json => "JSON",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Built-in scalars are part of every schema and are never registered.
    #[must_use]
    pub fn is_builtin(self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Int | Self::Float | Self::String | Self::Id
        )
    }

    fn description(self) -> Option<&'static str> {
        match self {
            Self::Long => Some("A 64-bit integer"),
            Self::Char => Some("A single Unicode scalar value"),
            Self::Uuid => Some("A UUID in its canonical hyphenated form"),
            Self::Uri => Some("An absolute URI"),
            Self::DateTime => Some("An RFC 3339 timestamp with offset"),
            Self::BigDecimal => Some("An arbitrary-precision decimal number"),
            Self::BigInteger => Some("An arbitrary-precision integer"),
            Self::Json => Some("Arbitrary JSON data"),
            _ => None,
        }
    }

    fn specified_by_url(self) -> Option<&'static str> {
        match self {
            Self::Uuid => Some("https://www.rfc-editor.org/rfc/rfc4122"),
            Self::Uri => Some("https://www.rfc-editor.org/rfc/rfc3986"),
            Self::DateTime => Some("https://www.rfc-editor.org/rfc/rfc3339"),
            _ => None,
        }
    }

    /// Whether `value` is an acceptable input literal for this scalar.
    ///
    /// Built-in scalars are checked by the execution runtime and always pass.
    #[must_use]
    pub fn validate(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Boolean | Self::Int | Self::Float | Self::String | Self::Id | Self::Json, _) => {
                true
            },
            (Self::Long, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::Long, Value::String(s)) => s.parse::<i64>().is_ok() || s.parse::<u64>().is_ok(),
            (Self::Char, Value::String(s)) => s.chars().count() == 1,
            (Self::Uuid, Value::String(s)) => uuid::Uuid::parse_str(s).is_ok(),
            (Self::Uri, Value::String(s)) => url::Url::parse(s).is_ok(),
            (Self::DateTime, Value::String(s)) => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
            (Self::BigInteger, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::BigInteger, Value::String(s)) => is_integer_literal(s),
            (Self::BigDecimal, Value::Number(_)) => true,
            (Self::BigDecimal, Value::String(s)) => is_decimal_literal(s),
            _ => false,
        }
    }

    /// A registrable definition, or `None` for built-in scalars.
    #[must_use]
    pub fn definition(self) -> Option<Scalar> {
        if self.is_builtin() {
            return None;
        }
        let mut scalar = Scalar::new(self.name()).validator(move |value| self.validate(value));
        if let Some(description) = self.description() {
            scalar = scalar.description(description);
        }
        if let Some(url) = self.specified_by_url() {
            scalar = scalar.specified_by_url(url);
        }
        Some(scalar)
    }
}

/// The scalar a domain type maps to, if it is a primitive.
#[must_use]
pub fn scalar_kind(ty: &DomainType) -> Option<ScalarKind> {
    match ty {
        DomainType::Primitive(p) => Some(ScalarKind::of(*p)),
        _ => None,
    }
}

#[must_use]
pub fn is_scalar(ty: &DomainType) -> bool {
    scalar_kind(ty).is_some()
}

/// Range and shape check of a decoded JSON value against the primitive it
/// stands for. Stricter than the schema scalar: `Int` covers `u8` too.
#[must_use]
pub fn accepts(primitive: Primitive, value: &serde_json::Value) -> bool {
    use serde_json::Value as J;

    fn int_in(value: &J, min: i64, max: i64) -> bool {
        value.as_i64().is_some_and(|n| (min..=max).contains(&n))
    }

    match primitive {
        Primitive::Bool => value.is_boolean(),
        Primitive::I8 => int_in(value, i8::MIN.into(), i8::MAX.into()),
        Primitive::I16 => int_in(value, i16::MIN.into(), i16::MAX.into()),
        Primitive::I32 => int_in(value, i32::MIN.into(), i32::MAX.into()),
        Primitive::U8 => int_in(value, 0, u8::MAX.into()),
        Primitive::U16 => int_in(value, 0, u16::MAX.into()),
        Primitive::U32 => int_in(value, 0, u32::MAX.into()),
        Primitive::I64 => value.is_i64() || value.as_str().is_some_and(|s| s.parse::<i64>().is_ok()),
        Primitive::U64 => value.is_u64() || value.as_str().is_some_and(|s| s.parse::<u64>().is_ok()),
        Primitive::F32 | Primitive::F64 => value.is_number(),
        Primitive::Id | Primitive::String => value.is_string(),
        Primitive::Json => true,
        Primitive::Char => value.as_str().is_some_and(|s| s.chars().count() == 1),
        Primitive::Uuid => value.as_str().is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
        Primitive::Url => value.as_str().is_some_and(|s| url::Url::parse(s).is_ok()),
        Primitive::DateTime => value
            .as_str()
            .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok()),
        Primitive::Decimal => {
            value.is_number() || value.as_str().is_some_and(is_decimal_literal)
        },
        Primitive::BigInt => {
            value.is_i64() || value.is_u64() || value.as_str().is_some_and(is_integer_literal)
        },
    }
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal_literal(s: &str) -> bool {
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    if exponent.is_some_and(|e| !is_integer_literal(e)) {
        return false;
    }
    let unsigned = mantissa.strip_prefix(['-', '+']).unwrap_or(mantissa);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    (!int.is_empty() || !frac.is_empty())
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
}

pub fn gql_value_to_json(v: Value) -> Result<serde_json::Value, ScalarError> {
    match v {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Number(n) => Ok(serde_json::to_value(n)?),
        Value::String(s) => Ok(serde_json::Value::String(s)),
        Value::Boolean(b) => Ok(serde_json::Value::Bool(b)),
        Value::Enum(name) => Ok(serde_json::Value::String(name.to_string())),
        Value::List(l) => {
            let items: Result<Vec<serde_json::Value>, _> =
                l.into_iter().map(gql_value_to_json).collect();
            Ok(serde_json::Value::Array(items?))
        },
        Value::Object(m) => {
            let map: Result<serde_json::Map<String, serde_json::Value>, _> = m
                .into_iter()
                .map(|(k, v)| gql_value_to_json(v).map(|jv| (k.to_string(), jv)))
                .collect();
            Ok(serde_json::Value::Object(map?))
        },
        Value::Binary(_) => Err(ScalarError::UnsupportedValueType),
    }
}

#[must_use]
pub fn json_to_gql_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                Value::Number(Number::from_f64(f).unwrap_or_else(|| 0i32.into()))
            } else {
                Value::Null
            }
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(a) => Value::List(a.iter().map(json_to_gql_value).collect()),
        serde_json::Value::Object(m) => {
            let map: IndexMap<Name, Value> = m
                .iter()
                .map(|(k, v)| (Name::new(k), json_to_gql_value(v)))
                .collect();
            Value::Object(map)
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {super::*, rstest::rstest, serde_json::json};

    #[rstest]
    #[case(Primitive::Bool, "Boolean")]
    #[case(Primitive::I8, "Int")]
    #[case(Primitive::I16, "Int")]
    #[case(Primitive::I32, "Int")]
    #[case(Primitive::U8, "Int")]
    #[case(Primitive::U16, "Int")]
    #[case(Primitive::I64, "Long")]
    #[case(Primitive::U32, "Long")]
    #[case(Primitive::U64, "Long")]
    #[case(Primitive::F32, "Float")]
    #[case(Primitive::F64, "Float")]
    #[case(Primitive::Char, "Char")]
    #[case(Primitive::String, "String")]
    #[case(Primitive::Id, "ID")]
    #[case(Primitive::Uuid, "UUID")]
    #[case(Primitive::Url, "URI")]
    #[case(Primitive::DateTime, "DateTime")]
    #[case(Primitive::Decimal, "BigDecimal")]
    #[case(Primitive::BigInt, "BigInteger")]
    #[case(Primitive::Json, "JSON")]
    fn primitive_maps_to_scalar(#[case] primitive: Primitive, #[case] expected: &str) {
        let kind = scalar_kind(&primitive.into()).expect("scalar");
        assert_eq!(kind.name(), expected);
        assert_eq!(ScalarKind::from_name(expected), Some(kind));
    }

    #[test]
    fn non_primitives_are_not_scalars() {
        assert!(!is_scalar(&DomainType::list(Primitive::I32.into())));
        assert!(!is_scalar(&DomainType::reference("User")));
        assert!(is_scalar(&Primitive::Uuid.into()));
    }

    #[test]
    fn only_custom_scalars_have_definitions() {
        let custom: Vec<_> = ScalarKind::ALL
            .into_iter()
            .filter(|k| k.definition().is_some())
            .map(ScalarKind::name)
            .collect();
        assert_eq!(
            custom,
            [
                "Long",
                "Char",
                "UUID",
                "URI",
                "DateTime",
                "BigDecimal",
                "BigInteger",
                "JSON"
            ]
        );
    }

    #[rstest]
    #[case(ScalarKind::Uuid, "67e55044-10b1-426f-9247-bb680e5fe0c8", true)]
    #[case(ScalarKind::Uuid, "not-a-uuid", false)]
    #[case(ScalarKind::Uri, "https://example.com/a?b=c", true)]
    #[case(ScalarKind::Uri, "no scheme", false)]
    #[case(ScalarKind::DateTime, "2024-05-01T10:00:00+02:00", true)]
    #[case(ScalarKind::DateTime, "2024-05-01", false)]
    #[case(ScalarKind::Char, "x", true)]
    #[case(ScalarKind::Char, "xy", false)]
    #[case(ScalarKind::BigInteger, "-123456789012345678901234567890", true)]
    #[case(ScalarKind::BigInteger, "12.5", false)]
    #[case(ScalarKind::BigDecimal, "-12.50e-3", true)]
    #[case(ScalarKind::BigDecimal, ".", false)]
    #[case(ScalarKind::Long, "9223372036854775807", true)]
    #[case(ScalarKind::Long, "1e3", false)]
    fn custom_scalars_validate_strings(
        #[case] kind: ScalarKind,
        #[case] input: &str,
        #[case] ok: bool,
    ) {
        assert_eq!(kind.validate(&Value::String(input.into())), ok, "{input}");
    }

    #[test]
    fn long_rejects_fractions() {
        let fraction = Value::Number(Number::from_f64(1.5).expect("finite"));
        assert!(!ScalarKind::Long.validate(&fraction));
        assert!(ScalarKind::Long.validate(&Value::Number(i64::MIN.into())));
    }

    #[rstest]
    #[case(Primitive::I8, json!(127), true)]
    #[case(Primitive::I8, json!(128), false)]
    #[case(Primitive::U8, json!(-1), false)]
    #[case(Primitive::U32, json!(4_294_967_295_u64), true)]
    #[case(Primitive::I32, json!(2.5), false)]
    #[case(Primitive::U64, json!("18446744073709551615"), true)]
    #[case(Primitive::Bool, json!("true"), false)]
    #[case(Primitive::Uuid, json!("67e55044-10b1-426f-9247-bb680e5fe0c8"), true)]
    fn primitives_check_ranges(
        #[case] primitive: Primitive,
        #[case] value: serde_json::Value,
        #[case] ok: bool,
    ) {
        assert_eq!(accepts(primitive, &value), ok);
    }

    #[test]
    fn json_conversion_round_trips_structures() {
        let input = Value::Object(
            [
                (Name::new("a"), Value::Number(1.into())),
                (Name::new("b"), Value::Boolean(true)),
                (
                    Name::new("c"),
                    Value::List(vec![Value::String("x".into()), Value::Null]),
                ),
                (Name::new("d"), Value::Enum(Name::new("RED"))),
            ]
            .into_iter()
            .collect(),
        );

        let json = gql_value_to_json(input).expect("to json");
        assert_eq!(json, json!({"a": 1, "b": true, "c": ["x", null], "d": "RED"}));
        let back = json_to_gql_value(&json);
        assert_eq!(gql_value_to_json(back).expect("to json"), json);
    }

    #[test]
    fn conversion_rejects_binary() {
        let err = gql_value_to_json(Value::Binary(vec![1u8, 2].into())).expect_err("binary");
        assert!(err.to_string().contains("unsupported value type"));
    }

    #[test]
    fn large_unsigned_numbers_survive() {
        let json = json!(u64::MAX);
        assert_eq!(json_to_gql_value(&json), Value::Number(u64::MAX.into()));
    }
}
