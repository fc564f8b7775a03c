//! Plantilla fija del prompt enviado al modelo generativo.
//!
//! El único parámetro es el nombre de la sustancia tal como lo escribió el
//! usuario. La respuesta pedida es JSON con `products[]` y `references[]`.

const PROMPT_HEAD: &str = "Como um especialista em química analítica sênior, me apresente de forma objetiva em formato de tabela os produtos de degradação da ";

const PROMPT_BODY: &str = ", organizando como atributos os nomes das substâncias formadas, a via de degradação química, as condições ambientais que a favorecem e os dados de toxicidade relatados na literatura científica para esse produto de degradação formado. Ao final, embaixo da tabela, apresente as referências bibliográficas dessas informações apresentadas.

Por favor, formate sua resposta em JSON com a seguinte estrutura:
{
  \"products\": [
    {
      \"substance\": \"nome da substância formada\",
      \"degradationRoute\": \"via de degradação química\",
      \"environmentalConditions\": \"condições ambientais que favorecem\",
      \"toxicityData\": \"dados de toxicidade relatados\"
    }
  ],
  \"references\": [
    \"referência bibliográfica 1\",
    \"referência bibliográfica 2\"
  ]
}";

/// Construye el prompt para `substance_name`.
pub fn build_prompt(substance_name: &str) -> String {
    let mut prompt = String::with_capacity(PROMPT_HEAD.len() + substance_name.len() + PROMPT_BODY.len());
    prompt.push_str(PROMPT_HEAD);
    prompt.push_str(substance_name);
    prompt.push_str(PROMPT_BODY);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_name_and_schema_keys() {
        let p = build_prompt("Paracetamol");
        assert!(p.contains("produtos de degradação da Paracetamol,"));
        for key in ["\"products\"", "\"substance\"", "\"degradationRoute\"", "\"environmentalConditions\"", "\"toxicityData\"", "\"references\""] {
            assert!(p.contains(key), "missing {key}");
        }
    }

    #[test]
    fn prompt_depends_only_on_name() {
        assert_eq!(build_prompt("x"), build_prompt("x"));
        assert_ne!(build_prompt("x"), build_prompt("y"));
    }
}
