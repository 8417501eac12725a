//! Cache value type definitions
//!
//! The cache holds text; the closed tagged type below is the only thing
//! that crosses the boundary. Round trips are lossless for exactly this
//! set of kinds - a composite encoded upstream decodes as `Str`.

use std::fmt;

/// Closed set of cache value kinds
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl CacheValue {
    /// Encode to the cache text form. Booleans use the literal
    /// `"True"`/`"False"` spelling shared with the other writers of this
    /// cache.
    pub fn encode(&self) -> String {
        match self {
            CacheValue::Bool(true) => "True".to_string(),
            CacheValue::Bool(false) => "False".to_string(),
            CacheValue::Int(i) => i.to_string(),
            CacheValue::Float(f) => f.to_string(),
            CacheValue::Str(s) => s.clone(),
        }
    }

    /// Decode from the cache text form. Total: precedence is
    /// Bool, Int, Float, then raw Str.
    pub fn decode(raw: &str) -> CacheValue {
        match raw {
            "True" => CacheValue::Bool(true),
            "False" => CacheValue::Bool(false),
            _ => {
                if let Ok(i) = raw.parse::<i64>() {
                    CacheValue::Int(i)
                } else if let Ok(f) = raw.parse::<f64>() {
                    CacheValue::Float(f)
                } else {
                    CacheValue::Str(raw.to_string())
                }
            }
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CacheValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            CacheValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<bool> for CacheValue {
    fn from(v: bool) -> Self {
        CacheValue::Bool(v)
    }
}

impl From<i64> for CacheValue {
    fn from(v: i64) -> Self {
        CacheValue::Int(v)
    }
}

impl From<f64> for CacheValue {
    fn from(v: f64) -> Self {
        CacheValue::Float(v)
    }
}

impl From<&str> for CacheValue {
    fn from(v: &str) -> Self {
        CacheValue::Str(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_kinds_round_trip() {
        for value in [
            CacheValue::Bool(true),
            CacheValue::Bool(false),
            CacheValue::Int(42),
            CacheValue::Float(3.14),
            CacheValue::Str("hello".to_string()),
        ] {
            assert_eq!(CacheValue::decode(&value.encode()), value);
        }
    }

    #[test]
    fn test_booleans_use_literal_spelling() {
        assert_eq!(CacheValue::Bool(true).encode(), "True");
        assert_eq!(CacheValue::Bool(false).encode(), "False");
        // lowercase is not the shared spelling and decodes as a string
        assert_eq!(
            CacheValue::decode("true"),
            CacheValue::Str("true".to_string())
        );
    }

    #[test]
    fn test_composite_encoding_decodes_as_raw_string() {
        assert_eq!(
            CacheValue::decode("[1, 2, 3]"),
            CacheValue::Str("[1, 2, 3]".to_string())
        );
    }

    #[test]
    fn test_numeric_precedence_int_before_float() {
        assert_eq!(CacheValue::decode("42"), CacheValue::Int(42));
        assert_eq!(CacheValue::decode("42.0"), CacheValue::Float(42.0));
        assert_eq!(CacheValue::decode("-7"), CacheValue::Int(-7));
    }
}
