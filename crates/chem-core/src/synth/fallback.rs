//! Dataset estático de respaldo.
//!
//! Se usa cuando no hay credencial de modelo, cuando la respuesta del modelo
//! no se puede interpretar y en ERROR_RECOVERY. Búsqueda exacta por nombre en
//! minúsculas; cualquier otro nombre recibe una fila genérica.
//!
//! Nota: no modificar orden ni contenido sin necesidad; el pipeline promete
//! respuestas idénticas para la misma clave.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use chem_domain::{DegradationProduct, DegradationReport, SubstanceKey};

type Row = (&'static str, &'static str, &'static str, &'static str);

const PARACETAMOL_PRODUCTS: &[Row] = &[
    ("N-acetil-p-benzoquinona imina (NAPQI)",
     "Oxidação metabólica via CYP2E1",
     "pH fisiológico, presença de oxigênio, temperatura corporal (37°C)",
     "Altamente hepatotóxico, responsável pela toxicidade do paracetamol em overdose"),
    ("p-aminofenol",
     "Hidrólise da ligação amida",
     "pH ácido (< 4), temperatura elevada (> 60°C), umidade alta",
     "Moderadamente tóxico, pode causar metahemoglobinemia e nefrotoxicidade"),
    ("Ácido p-hidroxibenzóico",
     "Oxidação do grupo amino seguida de desaminação",
     "Presença de oxidantes, luz UV, pH alcalino (> 8)",
     "Baixa toxicidade, usado como conservante alimentar (E-214)"),
];

const PARACETAMOL_REFERENCES: &[&str] = &[
    "Larson, A. M., et al. (2005). Acetaminophen-induced acute liver failure: results of a United States multicenter, prospective study. Hepatology, 42(6), 1364-1372.",
    "McGill, M. R., & Jaeschke, H. (2013). Metabolism and disposition of acetaminophen: recent advances in relation to hepatotoxicity and diagnosis. Pharmaceutical research, 30(9), 2174-2187.",
    "Prescott, L. F. (2000). Paracetamol, alcohol and the liver. British journal of clinical pharmacology, 49(4), 291-301.",
    "Dahlin, D. C., et al. (1984). N-acetyl-p-benzoquinone imine: a cytochrome P-450-mediated oxidation product of acetaminophen. Proceedings of the National Academy of Sciences, 81(5), 1327-1331.",
];

const IBUPROFENO_PRODUCTS: &[Row] = &[
    ("Ácido 2-[4-(2-carboxipropil)fenil]propiônico",
     "Oxidação da cadeia lateral isobutílica",
     "pH neutro (6-8), presença de oxigênio, catálise enzimática (CYP2C9)",
     "Toxicidade renal moderada, menor nefrotoxicidade que o composto original"),
    ("4-isobutilfenol",
     "Descarboxilação térmica",
     "Temperatura elevada (> 80°C), pH ácido (< 3), ausência de água",
     "Potencial irritante dérmico e ocular, dados limitados de toxicidade sistêmica"),
    ("Ácido 2-[4-(1-hidroxi-2-metilpropil)fenil]propiônico",
     "Hidroxilação da cadeia lateral",
     "Presença de enzimas CYP, pH fisiológico, temperatura corporal",
     "Perfil de toxicidade similar ao ibuprofeno, menor atividade anti-inflamatória"),
];

const IBUPROFENO_REFERENCES: &[&str] = &[
    "Davies, N. M. (1998). Clinical pharmacokinetics of ibuprofen. Clinical pharmacokinetics, 34(2), 101-154.",
    "Rainsford, K. D. (2009). Ibuprofen: pharmacology, efficacy and safety. Inflammopharmacology, 17(6), 275-342.",
    "Mazaleuskaya, L. L., et al. (2015). PharmGKB summary: ibuprofen pathways. Pharmacogenetics and genomics, 25(2), 96-106.",
];

const GENERIC_ROUTE: &str = "Múltiplas vias de degradação possíveis (hidrólise, oxidação, fotólise)";
const GENERIC_CONDITIONS: &str = "Variáveis conforme condições específicas (pH, temperatura, luz, oxigênio)";
const GENERIC_TOXICITY: &str = "Dados de toxicidade específicos requerem análise detalhada da literatura científica";

const GENERIC_REFERENCES: &[&str] = &[
    "Para informações específicas sobre produtos de degradação, consulte bases de dados especializadas como PubMed, SciFinder ou Reaxys.",
    "Diretrizes ICH Q1A(R2) - Stability Testing of New Drug Substances and Products.",
    "USP <1225> Validation of Compendial Procedures - Analytical validation guidelines.",
];

fn build(products: &[Row], references: &[&str]) -> DegradationReport {
    let products = products.iter()
                           .filter_map(|(s, r, c, t)| DegradationProduct::new(*s, *r, *c, *t).ok())
                           .collect();
    DegradationReport::new(products, references.iter().map(|r| r.to_string()).collect())
}

/// Tabla de sustancias conocidas, indexada por clave en minúsculas.
static KNOWN_SUBSTANCES: Lazy<IndexMap<&'static str, DegradationReport>> = Lazy::new(|| {
    let mut table = IndexMap::new();
    table.insert("paracetamol", build(PARACETAMOL_PRODUCTS, PARACETAMOL_REFERENCES));
    table.insert("ibuprofeno", build(IBUPROFENO_PRODUCTS, IBUPROFENO_REFERENCES));
    table
});

/// Nombres (claves) presentes en el dataset estático, en orden de declaración.
pub fn known_substances() -> Vec<&'static str> {
    KNOWN_SUBSTANCES.keys().copied().collect()
}

/// Reporte estático para `substance_name`.
///
/// Para nombres desconocidos devuelve una única fila genérica cuyo campo
/// `substance` contiene el nombre literal recibido.
pub fn static_report(substance_name: &str) -> DegradationReport {
    let key = SubstanceKey::new(substance_name);
    if let Some(report) = KNOWN_SUBSTANCES.get(key.as_str()) {
        return report.clone();
    }
    let generic = format!("Produtos de degradação de {substance_name}");
    let products = DegradationProduct::new(generic, GENERIC_ROUTE, GENERIC_CONDITIONS, GENERIC_TOXICITY).into_iter()
                                                                                                     .collect();
    DegradationReport::new(products, GENERIC_REFERENCES.iter().map(|r| r.to_string()).collect())
}
