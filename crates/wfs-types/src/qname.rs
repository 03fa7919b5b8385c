use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A qualified XML name as carried by `typeName`-style attribute values.
///
/// Prefixes are kept as written and never resolved against the in-scope
/// namespace bindings; resolution is a serializer concern.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    #[serde(default)]
    pub namespace: String,
    pub local: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl QName {
    /// A name bound to a namespace URI.
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
            prefix: None,
        }
    }

    /// A prefixed name whose namespace is not yet known.
    pub fn prefixed(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: String::new(),
            local: local.into(),
            prefix: Some(prefix.into()),
        }
    }
}

fn valid_ncname(s: &str) -> bool {
    !s.is_empty() && !s.contains(':') && !s.chars().any(char::is_whitespace)
}

/// Accepts Clark notation (`{uri}local`), `prefix:local`, or a bare local name.
impl FromStr for QName {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidQName(s.to_string());

        if let Some(rest) = s.strip_prefix('{') {
            let (namespace, local) = rest.split_once('}').ok_or_else(invalid)?;
            if !valid_ncname(local) {
                return Err(invalid());
            }
            return Ok(Self::new(namespace, local));
        }

        match s.split_once(':') {
            Some((prefix, local)) if valid_ncname(prefix) && valid_ncname(local) => {
                Ok(Self::prefixed(prefix, local))
            }
            Some(_) => Err(invalid()),
            None if valid_ncname(s) => Ok(Self::new("", s)),
            None => Err(invalid()),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.prefix, self.namespace.is_empty()) {
            (_, false) => write!(f, "{{{}}}{}", self.namespace, self.local),
            (Some(prefix), true) => write!(f, "{prefix}:{}", self.local),
            (None, true) => write!(f, "{}", self.local),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_clark_notation() {
        let q: QName = "{urn:roads}Road".parse().unwrap();
        assert_eq!(q.namespace, "urn:roads");
        assert_eq!(q.local, "Road");
        assert_eq!(q.prefix, None);
        assert_eq!(q.to_string(), "{urn:roads}Road");
    }

    #[test]
    fn parse_prefixed_keeps_prefix_unresolved() {
        let q: QName = "topp:states".parse().unwrap();
        assert_eq!(q.prefix.as_deref(), Some("topp"));
        assert!(q.namespace.is_empty());
        assert_eq!(q.to_string(), "topp:states");
    }

    #[test]
    fn parse_bare_name() {
        let q: QName = "states".parse().unwrap();
        assert_eq!(q, QName::new("", "states"));
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["", "a:b:c", ":b", "a:", "{urn:x", "{urn:x}", "has space"] {
            assert!(bad.parse::<QName>().is_err(), "{bad:?} should be rejected");
        }
    }
}
