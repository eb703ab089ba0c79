use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::document::GraphDocument;

pub(super) fn parse_graph_document(raw: &str) -> Result<GraphDocument> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in graph document")?;
    if !parsed.is_object() {
        return Err(anyhow!("unexpected JSON type for graph document; expected an object"));
    }

    serde_json::from_value(parsed).context("graph document does not match the expected schema")
}

#[cfg(test)]
pub(crate) const SAMPLE_DOCUMENT: &str = r#"{
    "query_info": { "from": "2024-01-01", "to": "2024-01-02" },
    "company_nodes": [
        {
            "type": "company",
            "ISIN": "US67066G1040",
            "name": "NVIDIA",
            "priceFrom": 113.54,
            "priceTo": 115.54,
            "priceChange": 1.0176149375,
            "currency": "USD",
            "market": "NASDAQ",
            "source": "Yahoo Finance"
        },
        {
            "type": "company",
            "ISIN": "US0378331005",
            "name": "Apple",
            "priceFrom": 170.34,
            "priceTo": 172.80,
            "priceChange": 1.0144417048,
            "currency": "USD",
            "market": "NASDAQ",
            "source": "Yahoo Finance"
        }
    ],
    "keyword_nodes": [
        { "type": "keyword", "keyword": "AI 칩", "priceChange": 1.0176149375 },
        { "type": "keyword", "keyword": "iPhone", "priceChange": 1.0144417048 },
        { "type": "keyword", "keyword": "Mac", "priceChange": 0.99 }
    ],
    "edges": [
        { "source": "NVIDIA", "target": "AI 칩", "weight": 0.9 },
        { "source": "Apple", "target": "iPhone", "weight": 0.85 },
        { "source": "Apple", "target": "Mac", "weight": -0.4 }
    ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_sample() {
        let document = parse_graph_document(SAMPLE_DOCUMENT).unwrap();

        assert_eq!(document.query_info.from, "2024-01-01");
        assert_eq!(document.company_nodes.len(), 2);
        assert_eq!(document.company_nodes[0].isin, "US67066G1040");
        assert_eq!(document.company_nodes[1].price_to, 172.80);
        assert_eq!(document.keyword_nodes[0].keyword, "AI 칩");
        assert_eq!(document.edges[2].weight, -0.4);
        assert_eq!(
            document.date_range_label().as_deref(),
            Some("2024-01-01 → 2024-01-02")
        );
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let document = parse_graph_document(r#"{ "edges": [] }"#).unwrap();

        assert!(document.company_nodes.is_empty());
        assert!(document.keyword_nodes.is_empty());
        assert_eq!(document.date_range_label(), None);
    }

    #[test]
    fn rejects_non_object_payload() {
        let error = parse_graph_document("[1, 2, 3]").unwrap_err();
        assert!(error.to_string().contains("expected an object"));
    }

    #[test]
    fn reports_schema_mismatch_with_context() {
        let error =
            parse_graph_document(r#"{ "edges": [{ "source": "A", "target": "B" }] }"#).unwrap_err();
        let rendered = format!("{error:#}");
        assert!(rendered.contains("expected schema"));
        assert!(rendered.contains("weight"));
    }
}
