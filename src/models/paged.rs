use serde::{Deserialize, Serialize};

/// Página de resultados exatamente como o servidor a devolve.
///
/// O cliente nunca reordena nem combina páginas; campos faltantes viram o
/// valor padrão para tolerar respostas parciais.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paged<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default, rename = "pageCount")]
    pub page_count: u32,
    #[serde(default)]
    pub content: Vec<T>,
}
