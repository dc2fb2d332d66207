use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a JSON-RPC request: an integer or a string.
///
/// Integers that fit in an `i64` are always held as [`RequestId::Number`];
/// [`RequestId::Unsigned`] only carries ids above `i64::MAX`.
///
/// A `null` id is modelled as `Option::<RequestId>::None` at the use site, so
/// that a request carrying `"id": null` and a response whose id was forced to
/// null share the same representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
    Unsigned(u64),
}

impl RequestId {
    /// Read an id from a decoded JSON value.
    ///
    /// Returns `Ok(None)` for `null` and `Err(())` for anything that is not an
    /// integer, a string or null. Floating point ids are rejected even when
    /// their fractional part is zero.
    pub(crate) fn from_value(value: &Value) -> Result<Option<Self>, ()> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(RequestId::String(s.clone()))),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(n), _) => Ok(Some(RequestId::Number(n))),
                (None, Some(n)) => Ok(Some(RequestId::Unsigned(n))),
                (None, None) => Err(()),
            },
            _ => Err(()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RequestId::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RequestId::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            RequestId::Number(n) => u64::try_from(*n).ok(),
            RequestId::Unsigned(n) => Some(*n),
            RequestId::String(_) => None,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{}", s),
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::Unsigned(n) => write!(f, "{}", n),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => RequestId::Number(n),
            Err(_) => RequestId::Unsigned(n),
        }
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

/// JSON-RPC version marker, always serialized as `"2.0"`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonRpcVersion {
    #[default]
    V2_0,
}

impl JsonRpcVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonRpcVersion::V2_0 => crate::JSONRPC_VERSION,
        }
    }
}

impl fmt::Display for JsonRpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            crate::JSONRPC_VERSION => Ok(JsonRpcVersion::V2_0),
            _ => Err(serde::de::Error::custom(format!(
                "Invalid JSON-RPC version: {}",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_id_serialization() {
        let id_str = RequestId::String("test".to_string());
        let id_num = RequestId::Number(42);

        assert_eq!(serde_json::to_string(&id_str).unwrap(), r#""test""#);
        assert_eq!(serde_json::to_string(&id_num).unwrap(), "42");
    }

    #[test]
    fn test_request_id_from_value() {
        assert_eq!(RequestId::from_value(&json!(7)), Ok(Some(RequestId::Number(7))));
        assert_eq!(
            RequestId::from_value(&json!("abc")),
            Ok(Some(RequestId::String("abc".to_string())))
        );
        assert_eq!(RequestId::from_value(&json!(null)), Ok(None));
        assert_eq!(
            RequestId::from_value(&json!(u64::MAX)),
            Ok(Some(RequestId::Unsigned(u64::MAX)))
        );
        assert_eq!(
            RequestId::from_value(&json!(i64::MIN)),
            Ok(Some(RequestId::Number(i64::MIN)))
        );
        assert!(RequestId::from_value(&json!(1.5)).is_err());
        assert!(RequestId::from_value(&json!(2.0)).is_err());
        assert!(RequestId::from_value(&json!(true)).is_err());
        assert!(RequestId::from_value(&json!([1])).is_err());
    }

    #[test]
    fn test_unsigned_request_id() {
        let id = RequestId::from(u64::MAX);
        assert_eq!(id, RequestId::Unsigned(18446744073709551615));
        assert_eq!(id.as_u64(), Some(u64::MAX));
        assert_eq!(id.as_i64(), None);
        assert_eq!(id.to_string(), "18446744073709551615");
        assert_eq!(serde_json::to_string(&id).unwrap(), "18446744073709551615");
        assert_eq!(serde_json::from_str::<RequestId>("18446744073709551615").unwrap(), id);

        // Small unsigned values stay in the signed form
        assert_eq!(RequestId::from(7u64), RequestId::Number(7));
        assert_eq!(serde_json::from_str::<RequestId>("7").unwrap(), RequestId::Number(7));
        assert_eq!(RequestId::Number(-1).as_u64(), None);
    }

    #[test]
    fn test_json_rpc_version() {
        let version = JsonRpcVersion::V2_0;
        assert_eq!(version.as_str(), "2.0");
        assert_eq!(serde_json::to_string(&version).unwrap(), r#""2.0""#);
        assert!(serde_json::from_str::<JsonRpcVersion>(r#""1.0""#).is_err());
    }
}
