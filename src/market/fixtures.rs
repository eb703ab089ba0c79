use super::document::{CompanyRecord, EdgeRecord, GraphDocument, KeywordRecord};

pub(crate) use super::parse::SAMPLE_DOCUMENT;

pub(crate) fn company(name: &str) -> CompanyRecord {
    CompanyRecord {
        kind: "company".to_owned(),
        isin: format!("ISIN-{name}"),
        name: name.to_owned(),
        price_from: 10.0,
        price_to: 11.0,
        price_change: 1.1,
        currency: "USD".to_owned(),
        market: "NASDAQ".to_owned(),
        source: "test".to_owned(),
    }
}

pub(crate) fn keyword(text: &str) -> KeywordRecord {
    KeywordRecord {
        kind: "keyword".to_owned(),
        keyword: text.to_owned(),
        price_change: 0.97,
    }
}

pub(crate) fn edge(source: &str, target: &str, weight: f64) -> EdgeRecord {
    EdgeRecord {
        source: source.to_owned(),
        target: target.to_owned(),
        weight,
    }
}

/// Companies `A`, `B` and keyword `k`; `A -> k` is positive, `B -> k` negative.
pub(crate) fn two_companies_one_keyword() -> GraphDocument {
    GraphDocument {
        company_nodes: vec![company("A"), company("B")],
        keyword_nodes: vec![keyword("k")],
        edges: vec![edge("A", "k", 0.8), edge("B", "k", -0.5)],
        ..GraphDocument::default()
    }
}

pub(crate) fn sample_document() -> GraphDocument {
    serde_json::from_str(SAMPLE_DOCUMENT).expect("sample document is valid")
}
