//! Constantes del pipeline de resolución.

/// Temperatura de muestreo por defecto para el modelo generativo. Baja para
/// favorecer respuestas deterministas.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Valor por defecto de una celda ausente en la tabla de texto.
pub const NOT_SPECIFIED: &str = "Não especificado";

/// Referencia genérica añadida cuando la tabla de texto no trae bibliografía.
pub const GENERIC_LITERATURE_REFERENCE: &str =
    "Consulte literatura científica especializada para informações detalhadas sobre produtos de degradação.";

/// Número mínimo de celdas no vacías para aceptar una fila de la tabla.
pub const MIN_TABLE_COLUMNS: usize = 4;

/// Longitud máxima del user-agent copiado en la metadata de eventos.
pub const USER_AGENT_METADATA_LEN: usize = 100;

/// Límites por defecto de las vistas analíticas.
pub const DEFAULT_STATISTICS_LIMIT: usize = 10;
pub const DEFAULT_RECENT_LIMIT: usize = 20;
