//! Estrategias de interpretación de la respuesta del modelo.
//!
//! Se aplican en orden (`ParseStrategy::CHAIN`): JSON, tabla con `|`, dataset
//! estático. Son funciones puras, testeables sin red.

use chem_domain::{DegradationProduct, DegradationReport};

use crate::constants::{GENERIC_LITERATURE_REFERENCE, MIN_TABLE_COLUMNS, NOT_SPECIFIED};
use crate::synth::fallback::static_report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseStrategy {
    /// Primer objeto `{...}` balanceado del texto, deserializado como reporte.
    Json,
    /// Pseudo-tabla delimitada por `|` con bibliografía tras un marcador.
    PipeTable,
    /// Dataset estático por nombre de sustancia.
    StaticFallback,
}

impl ParseStrategy {
    pub const CHAIN: [ParseStrategy; 3] = [ParseStrategy::Json, ParseStrategy::PipeTable, ParseStrategy::StaticFallback];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStrategy::Json => "json",
            ParseStrategy::PipeTable => "pipe_table",
            ParseStrategy::StaticFallback => "static_fallback",
        }
    }

    /// Intenta producir un reporte con esta estrategia.
    pub fn apply(&self, text: &str, substance_name: &str) -> Option<DegradationReport> {
        match self {
            ParseStrategy::Json => parse_json_report(text),
            ParseStrategy::PipeTable => parse_pipe_table(text),
            ParseStrategy::StaticFallback => Some(static_report(substance_name)),
        }
    }
}

/// Recorre la cadena de estrategias y devuelve el primer reporte obtenido
/// junto con la estrategia que lo produjo.
pub fn parse_response(text: &str, substance_name: &str) -> (DegradationReport, ParseStrategy) {
    for strategy in ParseStrategy::CHAIN {
        if let Some(report) = strategy.apply(text, substance_name) {
            return (report, strategy);
        }
    }
    (static_report(substance_name), ParseStrategy::StaticFallback)
}

/// Devuelve el primer objeto JSON de nivel superior con llaves balanceadas.
///
/// Las llaves dentro de strings JSON (incluidas las escapadas) no cuentan.
/// Si una `{` nunca se cierra se prueba con la siguiente.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (i, &b) in bytes.iter().enumerate().skip(open) {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[open..=i]);
                    }
                }
                _ => {}
            }
        }
        start = open + 1;
    }
    None
}

/// Estrategia JSON: objeto balanceado + claves requeridas + validación.
pub fn parse_json_report(text: &str) -> Option<DegradationReport> {
    let raw = extract_json_object(text)?;
    DegradationReport::from_json_str(raw).ok()
}

fn is_reference_marker(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("referência") || lower.contains("bibliografia")
}

fn is_header_or_separator(line: &str) -> bool {
    line.contains("Produto") || line.contains("---")
}

/// Estrategia de tabla de texto.
///
/// Devuelve `None` si no se extrajo ningún producto (el llamador pasa al
/// dataset estático). Si hay productos pero no bibliografía, añade una
/// referencia genérica.
pub fn parse_pipe_table(text: &str) -> Option<DegradationReport> {
    let mut products = Vec::new();
    let mut references = Vec::new();
    let mut in_references = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_reference_marker(line) {
            in_references = true;
            continue;
        }
        if in_references {
            if !line.contains('|') {
                references.push(line.to_string());
            }
            continue;
        }
        if !line.contains('|') || is_header_or_separator(line) {
            continue;
        }
        let cells: Vec<&str> = line.split('|').map(str::trim).filter(|c| !c.is_empty()).collect();
        if cells.len() < MIN_TABLE_COLUMNS {
            continue;
        }
        let cell = |i: usize| cells.get(i).copied().unwrap_or(NOT_SPECIFIED);
        if let Ok(product) = DegradationProduct::new(cell(0), cell(1), cell(2), cell(3)) {
            products.push(product);
        }
    }

    if products.is_empty() {
        return None;
    }
    if references.is_empty() {
        references.push(GENERIC_LITERATURE_REFERENCE.to_string());
    }
    Some(DegradationReport::new(products, references))
}
