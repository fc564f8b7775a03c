// report.rs
use crate::DomainError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Producto de degradación de una sustancia padre.
///
/// Los cuatro campos son texto libre. Sólo `substance` tiene invariante: no
/// puede quedar vacío (tras recortar espacios).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradationProduct {
    substance: String,
    degradation_route: String,
    environmental_conditions: String,
    toxicity_data: String,
}

impl DegradationProduct {
    /// Construye un producto validando que `substance` no esté vacío.
    ///
    /// # Errores
    /// Retorna `DomainError::ValidationError` si el nombre de la sustancia
    /// formada está vacío.
    pub fn new(substance: impl Into<String>,
               degradation_route: impl Into<String>,
               environmental_conditions: impl Into<String>,
               toxicity_data: impl Into<String>)
               -> Result<Self, DomainError> {
        let product = DegradationProduct { substance: substance.into(),
                                           degradation_route: degradation_route.into(),
                                           environmental_conditions: environmental_conditions.into(),
                                           toxicity_data: toxicity_data.into() };
        product.validate()?;
        Ok(product)
    }

    /// Revalida la invariante (útil tras deserializar JSON externo).
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.substance.trim().is_empty() {
            return Err(DomainError::ValidationError("El producto de degradación requiere nombre de sustancia".to_string()));
        }
        Ok(())
    }

    pub fn substance(&self) -> &str { &self.substance }
    pub fn degradation_route(&self) -> &str { &self.degradation_route }
    pub fn environmental_conditions(&self) -> &str { &self.environmental_conditions }
    pub fn toxicity_data(&self) -> &str { &self.toxicity_data }
}

impl fmt::Display for DegradationProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {} | {}", self.substance, self.degradation_route, self.environmental_conditions, self.toxicity_data)
    }
}

/// Artefacto raíz devuelto a todo llamador.
///
/// `products` y `references` siempre existen (pueden estar vacíos sólo en
/// caminos de error). El orden de `references` es el orden de presentación y
/// no se deduplica.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DegradationReport {
    products: Vec<DegradationProduct>,
    references: Vec<String>,
}

impl DegradationReport {
    pub fn new(products: Vec<DegradationProduct>, references: Vec<String>) -> Self {
        DegradationReport { products, references }
    }

    pub fn products(&self) -> &[DegradationProduct] { &self.products }
    pub fn references(&self) -> &[String] { &self.references }

    /// Valida cada producto; un reporte deserializado desde texto externo
    /// debe pasar por aquí antes de considerarse válido.
    pub fn validate(&self) -> Result<(), DomainError> {
        for product in &self.products {
            product.validate()?;
        }
        Ok(())
    }

    /// Hash SHA-256 (hex) del JSON serializado del reporte.
    ///
    /// La serialización de structs en serde_json respeta el orden de
    /// declaración de campos, por lo que dos reportes iguales producen el
    /// mismo hash.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        // Vec<String> y structs de String no fallan al serializar.
        hasher.update(serde_json::to_vec(self).unwrap_or_default());
        format!("{:x}", hasher.finalize())
    }

    /// Parsea y valida un reporte desde un string JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, DomainError> {
        let report: DegradationReport = serde_json::from_str(raw)?;
        report.validate()?;
        Ok(report)
    }
}
