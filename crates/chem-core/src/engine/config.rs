/// Configuración del orquestador.
///
/// Reemplaza las variantes paralelas del pipeline (cache primero, log
/// primero, mínimo) por una única implementación parametrizada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Consultar y escribir la cache. Sin backend de cache no tiene efecto.
    pub enable_cache: bool,
    /// Emitir eventos de sistema por etapa además del registro de resolución.
    pub enable_detailed_audit: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig { enable_cache: true,
                             enable_detailed_audit: true }
    }
}

impl OrchestratorConfig {
    /// Variante mínima: sin cache y sólo el registro de resolución.
    pub fn minimal() -> Self {
        OrchestratorConfig { enable_cache: false,
                             enable_detailed_audit: false }
    }
}
