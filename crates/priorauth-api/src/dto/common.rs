//! Common DTOs used across the API

use serde::{Deserialize, Serialize};

/// Wrapper for list endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ItemsResponse<T> {
    /// Returned items
    pub items: Vec<T>,
}

impl<T> ItemsResponse<T> {
    /// Wrap a list of items
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always true when the process answers
    pub ok: bool,
    /// Server time, RFC 3339
    pub time: String,
    /// Service name
    pub service: String,
    /// Build version
    pub version: String,
}

/// Deserialize an optional integer from a number, a numeric string, or
/// an empty string (treated as absent)
///
/// Query strings always carry text, and HTML forms send empty values for
/// untouched inputs.
pub fn deserialize_optional_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct OptionalI64Visitor;

    impl<'de> Visitor<'de> for OptionalI64Visitor {
        type Value = Option<i64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(i64::try_from(value).unwrap_or(i64::MAX)))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let value = value.trim();
            if value.is_empty() {
                return Ok(None);
            }
            value.parse::<i64>().map(Some).map_err(de::Error::custom)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(OptionalI64Visitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "deserialize_optional_number")]
        limit: Option<i64>,
    }

    #[test]
    fn test_optional_number_from_json() {
        let p: Params = serde_json::from_str(r#"{"limit": 5}"#).unwrap();
        assert_eq!(p.limit, Some(5));

        let p: Params = serde_json::from_str(r#"{"limit": "7"}"#).unwrap();
        assert_eq!(p.limit, Some(7));

        let p: Params = serde_json::from_str(r#"{"limit": ""}"#).unwrap();
        assert_eq!(p.limit, None);

        let p: Params = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.limit, None);

        assert!(serde_json::from_str::<Params>(r#"{"limit": "ten"}"#).is_err());
    }

    #[test]
    fn test_items_response_shape() {
        let json = serde_json::to_value(ItemsResponse::new(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({"items": [1, 2]}));
    }
}
