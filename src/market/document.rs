use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct QueryInfo {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CompanyRecord {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(rename = "ISIN")]
    pub isin: String,
    pub name: String,
    #[serde(rename = "priceFrom")]
    pub price_from: f64,
    #[serde(rename = "priceTo")]
    pub price_to: f64,
    #[serde(rename = "priceChange")]
    pub price_change: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub market: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct KeywordRecord {
    #[serde(default, rename = "type")]
    pub kind: String,
    pub keyword: String,
    #[serde(rename = "priceChange")]
    pub price_change: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// Graph document as served by the relation-mining backend.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphDocument {
    #[serde(default)]
    pub query_info: QueryInfo,
    #[serde(default)]
    pub company_nodes: Vec<CompanyRecord>,
    #[serde(default)]
    pub keyword_nodes: Vec<KeywordRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl GraphDocument {
    pub fn date_range_label(&self) -> Option<String> {
        let from = self.query_info.from.trim();
        let to = self.query_info.to.trim();
        if from.is_empty() && to.is_empty() {
            return None;
        }
        Some(format!("{from} → {to}"))
    }
}
