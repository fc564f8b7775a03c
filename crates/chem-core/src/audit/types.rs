use serde::{Deserialize, Serialize};

use chem_domain::{ResolutionRecord, SystemEvent};

/// Evento aceptado por el sumidero: un registro de resolución o un evento de
/// sistema libre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum AuditEvent {
    Resolution(ResolutionRecord),
    System(SystemEvent),
}

impl AuditEvent {
    /// Nombre legible de la variante para logging.
    pub fn variant_name(&self) -> &'static str {
        match self {
            AuditEvent::Resolution(_) => "Resolution",
            AuditEvent::System(_) => "System",
        }
    }
}

impl From<ResolutionRecord> for AuditEvent {
    fn from(r: ResolutionRecord) -> Self {
        AuditEvent::Resolution(r)
    }
}

impl From<SystemEvent> for AuditEvent {
    fn from(e: SystemEvent) -> Self {
        AuditEvent::System(e)
    }
}
