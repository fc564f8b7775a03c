use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefijo de las claves de cache persistentes.
pub const CACHE_KEY_PREFIX: &str = "substance_";

/// Clave normalizada de una sustancia: sin espacios en los extremos y en
/// minúsculas. Es la clave de Store, Cache y dataset estático.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubstanceKey(String);

impl SubstanceKey {
    pub fn new(raw: &str) -> Self {
        SubstanceKey(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// Clave usada por backends de cache compartidos (`substance_<nombre>`).
    pub fn cache_key(&self) -> String {
        format!("{CACHE_KEY_PREFIX}{}", self.0)
    }
}

impl fmt::Display for SubstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubstanceKey {
    fn from(raw: &str) -> Self {
        SubstanceKey::new(raw)
    }
}
