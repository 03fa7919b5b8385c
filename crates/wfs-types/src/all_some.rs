use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::scalar::Scalar;

/// The WFS `AllSomeType` enumeration used by `lockAction` and `releaseAction`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllSomeType {
    /// Lock or release every selected feature, or fail.
    #[default]
    #[serde(rename = "ALL")]
    All,
    /// Lock or release whatever features are available.
    #[serde(rename = "SOME")]
    Some,
}

impl AllSomeType {
    /// Every literal of the enumeration, in schema order.
    pub const LITERALS: [&'static str; 2] = ["ALL", "SOME"];

    pub fn literal(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Some => "SOME",
        }
    }
}

impl fmt::Display for AllSomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.literal())
    }
}

impl FromStr for AllSomeType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(Self::All),
            "SOME" => Ok(Self::Some),
            other => Err(TypeError::NotEnumerated {
                literal: other.to_string(),
                allowed: Self::LITERALS.iter().map(|l| l.to_string()).collect(),
            }),
        }
    }
}

impl From<AllSomeType> for Scalar {
    fn from(v: AllSomeType) -> Self {
        Scalar::String(v.literal().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_roundtrip() {
        for literal in AllSomeType::LITERALS {
            let parsed: AllSomeType = literal.parse().unwrap();
            assert_eq!(parsed.literal(), literal);
        }
    }

    #[test]
    fn literals_are_case_sensitive() {
        assert!("all".parse::<AllSomeType>().is_err());
    }

    #[test]
    fn default_is_all() {
        assert_eq!(AllSomeType::default(), AllSomeType::All);
    }

    #[test]
    fn serde_uses_schema_literals() {
        let json = serde_json::to_string(&AllSomeType::Some).unwrap();
        assert_eq!(json, "\"SOME\"");
    }
}
