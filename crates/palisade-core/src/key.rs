//! Cache key derivation
//!
//! A key is derived from a qualified operation name plus its bound arguments,
//! canonically serialized and hashed, then prefixed with the category name so
//! independent call sites cannot collide.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Debug;

/// Builder for deterministic cache keys
///
/// Arguments are bound by name and serialized through `serde_json`; the
/// resulting object has stable key ordering, so identical logical calls
/// always produce the same key regardless of the order arguments were added.
///
/// Values that fail to serialize fall back to their `Debug` text. This is
/// best-effort: it keeps key derivation total, but is not guaranteed
/// collision-free for exotic types.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    category: String,
    operation: String,
    args: serde_json::Map<String, Value>,
}

impl KeyBuilder {
    /// Start a key for `operation` under `category`
    pub fn new(category: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            operation: operation.into(),
            args: serde_json::Map::new(),
        }
    }

    /// Bind an argument by its parameter name
    pub fn arg<T: Serialize + Debug>(mut self, name: &str, value: &T) -> Self {
        let serialized = serde_json::to_value(value)
            .unwrap_or_else(|_| Value::String(format!("{value:?}")));
        self.args.insert(name.to_string(), serialized);
        self
    }

    /// The category this key belongs to
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Produce the final key: `{category}:{sha256(operation + args)}`
    pub fn build(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.operation.as_bytes());
        hasher.update(b"\0");
        hasher.update(Value::Object(self.args.clone()).to_string().as_bytes());

        let digest = hasher.finalize();
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            hex.push_str(&format!("{byte:02x}"));
        }
        format!("{}:{}", self.category, hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_call_same_key() {
        let a = KeyBuilder::new("analysis", "runner::collect")
            .arg("path", &"/tmp/project")
            .arg("depth", &3)
            .build();
        let b = KeyBuilder::new("analysis", "runner::collect")
            .arg("path", &"/tmp/project")
            .arg("depth", &3)
            .build();
        assert_eq!(a, b);
    }

    #[test]
    fn test_argument_order_is_irrelevant() {
        let a = KeyBuilder::new("llm", "client::complete")
            .arg("model", &"small")
            .arg("prompt", &"hello")
            .build();
        let b = KeyBuilder::new("llm", "client::complete")
            .arg("prompt", &"hello")
            .arg("model", &"small")
            .build();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_values_different_keys() {
        let a = KeyBuilder::new("llm", "client::complete")
            .arg("prompt", &"hello")
            .build();
        let b = KeyBuilder::new("llm", "client::complete")
            .arg("prompt", &"goodbye")
            .build();
        assert_ne!(a, b);
    }

    #[test]
    fn test_category_prefix() {
        let key = KeyBuilder::new("config", "loader::read").build();
        assert!(key.starts_with("config:"));

        let other = KeyBuilder::new("analysis", "loader::read").build();
        assert_ne!(key, other);
    }

    #[test]
    fn test_unserializable_argument_falls_back_to_text() {
        struct Opaque;

        impl Serialize for Opaque {
            fn serialize<S: serde::Serializer>(
                &self,
                _serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("not serializable"))
            }
        }

        impl Debug for Opaque {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "Opaque")
            }
        }

        let a = KeyBuilder::new("analysis", "op").arg("x", &Opaque).build();
        let b = KeyBuilder::new("analysis", "op").arg("x", &Opaque).build();
        assert_eq!(a, b);
    }
}
