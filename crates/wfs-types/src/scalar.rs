use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::qname::QName;

/// A simple-typed value held by an attribute or a simple-content element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    String(String),
    QName(QName),
}

impl Scalar {
    /// Short label of the value's kind, used in mismatch reports.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::QName(_) => "QName",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_qname(&self) -> Option<&QName> {
        match self {
            Self::QName(q) => Some(q),
            _ => None,
        }
    }
}

/// XML lexical form.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "{s}"),
            Self::QName(q) => write!(f, "{q}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<QName> for Scalar {
    fn from(q: QName) -> Self {
        Self::QName(q)
    }
}

/// Declared simple type of an attribute or simple-content element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Boolean,
    Integer,
    PositiveInteger,
    NonNegativeInteger,
    String,
    AnyUri,
    QName,
    /// A string restricted to the listed literals.
    Enumeration(Vec<String>),
}

impl ScalarType {
    /// Parse an XML literal (e.g. a schema default) into a value of this type.
    pub fn parse_literal(&self, literal: &str) -> Result<Scalar, TypeError> {
        let invalid = |type_name: &str| TypeError::InvalidLiteral {
            type_name: type_name.to_string(),
            literal: literal.to_string(),
        };

        match self {
            Self::Boolean => match literal.trim() {
                "true" | "1" => Ok(Scalar::Bool(true)),
                "false" | "0" => Ok(Scalar::Bool(false)),
                _ => Err(invalid("boolean")),
            },
            Self::Integer => literal
                .trim()
                .parse()
                .map(Scalar::Integer)
                .map_err(|_| invalid("integer")),
            Self::PositiveInteger => match literal.trim().parse::<i64>() {
                Ok(i) if i > 0 => Ok(Scalar::Integer(i)),
                _ => Err(invalid("positiveInteger")),
            },
            Self::NonNegativeInteger => match literal.trim().parse::<i64>() {
                Ok(i) if i >= 0 => Ok(Scalar::Integer(i)),
                _ => Err(invalid("nonNegativeInteger")),
            },
            Self::String | Self::AnyUri => Ok(Scalar::String(literal.to_string())),
            Self::QName => literal.trim().parse().map(Scalar::QName),
            Self::Enumeration(values) => {
                if values.iter().any(|v| v == literal) {
                    Ok(Scalar::String(literal.to_string()))
                } else {
                    Err(TypeError::NotEnumerated {
                        literal: literal.to_string(),
                        allowed: values.clone(),
                    })
                }
            }
        }
    }

    /// Returns `true` if `value` is a member of this type's value space.
    pub fn admits(&self, value: &Scalar) -> bool {
        match (self, value) {
            (Self::Boolean, Scalar::Bool(_)) => true,
            (Self::Integer, Scalar::Integer(_)) => true,
            (Self::PositiveInteger, Scalar::Integer(i)) => *i > 0,
            (Self::NonNegativeInteger, Scalar::Integer(i)) => *i >= 0,
            (Self::String | Self::AnyUri, Scalar::String(_)) => true,
            (Self::QName, Scalar::QName(_)) => true,
            (Self::Enumeration(values), Scalar::String(s)) => values.contains(s),
            _ => false,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::PositiveInteger => write!(f, "positiveInteger"),
            Self::NonNegativeInteger => write!(f, "nonNegativeInteger"),
            Self::String => write!(f, "string"),
            Self::AnyUri => write!(f, "anyURI"),
            Self::QName => write!(f, "QName"),
            Self::Enumeration(values) => write!(f, "enumeration({})", values.join("|")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_boolean_literals() {
        assert_eq!(ScalarType::Boolean.parse_literal("true").unwrap(), Scalar::Bool(true));
        assert_eq!(ScalarType::Boolean.parse_literal("0").unwrap(), Scalar::Bool(false));
        assert!(ScalarType::Boolean.parse_literal("yes").is_err());
    }

    #[test]
    fn positive_integer_rejects_zero() {
        assert_eq!(
            ScalarType::PositiveInteger.parse_literal("300").unwrap(),
            Scalar::Integer(300)
        );
        assert!(ScalarType::PositiveInteger.parse_literal("0").is_err());
        assert!(ScalarType::NonNegativeInteger.parse_literal("0").is_ok());
    }

    #[test]
    fn enumeration_checks_membership() {
        let all_some = ScalarType::Enumeration(vec!["ALL".into(), "SOME".into()]);
        assert_eq!(all_some.parse_literal("ALL").unwrap(), Scalar::from("ALL"));
        let err = all_some.parse_literal("NONE").unwrap_err();
        assert!(matches!(err, TypeError::NotEnumerated { .. }));
    }

    #[test]
    fn admits_matches_value_space() {
        assert!(ScalarType::AnyUri.admits(&Scalar::from("urn:x")));
        assert!(!ScalarType::Integer.admits(&Scalar::from("1")));
        assert!(!ScalarType::PositiveInteger.admits(&Scalar::Integer(-4)));
        assert!(ScalarType::QName.admits(&Scalar::QName(QName::new("", "a"))));
    }

    #[test]
    fn display_is_lexical() {
        assert_eq!(Scalar::Bool(false).to_string(), "false");
        assert_eq!(Scalar::Integer(42).to_string(), "42");
        assert_eq!(Scalar::from(QName::prefixed("topp", "roads")).to_string(), "topp:roads");
    }
}
