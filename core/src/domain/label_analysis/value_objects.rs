#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeLabelInput {
    /// Raw service name as sent by the caller, e.g. `analise_individual`.
    pub service: String,
    /// Data-URL image strings, in the order the caller sent them.
    pub images: Vec<String>,
}
