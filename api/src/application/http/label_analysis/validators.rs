use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AnalyzeLabelRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "'servico' não fornecido"))]
    #[schema(example = "analise_individual")]
    pub servico: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "'imagens' deve ser uma lista não vazia de strings base64"))]
    #[schema(example = json!(["data:image/jpeg;base64,/9j/4AAQSkZJRg..."]))]
    pub imagens: Vec<String>,
}

/// Shape the model is instructed to answer with. The relay does not enforce
/// it beyond requiring a JSON object.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeLabelResponse {
    pub servico: String,
    pub nome_produto: String,
    #[schema(example = "72")]
    pub pontuacao: String,
    #[schema(example = "Amarelo")]
    pub cor: String,
    pub alerta_principal: String,
    pub ingredientes: Vec<String>,
    pub informacoes_nutricionais: HashMap<String, String>,
    pub ingredientes_controversos: Vec<String>,
    pub justificativa_pontuacao: String,
}
