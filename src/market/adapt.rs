use std::collections::HashMap;

use log::{info, warn};
use thiserror::Error;

use super::document::{EdgeRecord, GraphDocument};
use super::graph::{
    CompanyAttributes, Edge, KeywordAttributes, MarketGraph, Vertex, VertexAttributes, VertexKind,
};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphDataError {
    #[error("edge {from} -> {to} references unknown vertex {missing:?}")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },
    #[error("vertex id {id:?} appears more than once; keeping the first record")]
    DuplicateVertex { id: String },
    #[error("vertex {id:?} is tagged {found:?} but listed with the {expected} nodes")]
    KindMismatch {
        id: String,
        expected: &'static str,
        found: String,
    },
}

/// Adapter output: the browsable graph plus every record that had to be dropped.
#[derive(Clone, Debug, Default)]
pub struct AdaptedGraph {
    pub graph: MarketGraph,
    pub errors: Vec<GraphDataError>,
}

impl AdaptedGraph {
    pub fn skipped_edge_count(&self) -> usize {
        self.errors
            .iter()
            .filter(|error| matches!(error, GraphDataError::DanglingEdge { .. }))
            .count()
    }
}

fn resolve_edge(
    record: &EdgeRecord,
    index_by_id: &HashMap<String, usize>,
) -> Result<Edge, GraphDataError> {
    let dangling = |missing: &str| GraphDataError::DanglingEdge {
        from: record.source.clone(),
        to: record.target.clone(),
        missing: missing.to_owned(),
    };

    let source = *index_by_id
        .get(&record.source)
        .ok_or_else(|| dangling(&record.source))?;
    let target = *index_by_id
        .get(&record.target)
        .ok_or_else(|| dangling(&record.target))?;

    Ok(Edge {
        source_id: record.source.clone(),
        target_id: record.target.clone(),
        source,
        target,
        weight: record.weight,
    })
}

/// An empty tag is accepted; the list a record sits in decides its kind.
fn kind_mismatch(id: &str, declared: &str, expected: VertexKind) -> Option<GraphDataError> {
    (!declared.is_empty() && declared != expected.label()).then(|| GraphDataError::KindMismatch {
        id: id.to_owned(),
        expected: expected.label(),
        found: declared.to_owned(),
    })
}

pub fn adapt_document(document: &GraphDocument) -> AdaptedGraph {
    let capacity = document.company_nodes.len() + document.keyword_nodes.len();
    let mut vertices = Vec::with_capacity(capacity);
    let mut index_by_id = HashMap::with_capacity(capacity);
    let mut errors = Vec::new();

    let declared_kinds = document
        .company_nodes
        .iter()
        .map(|company| (&company.name, &company.kind, VertexKind::Company))
        .chain(
            document
                .keyword_nodes
                .iter()
                .map(|keyword| (&keyword.keyword, &keyword.kind, VertexKind::Keyword)),
        );
    errors.extend(
        declared_kinds.filter_map(|(id, declared, expected)| kind_mismatch(id, declared, expected)),
    );

    let company_vertices = document.company_nodes.iter().map(|company| Vertex {
        id: company.name.clone(),
        label: company.name.clone(),
        attributes: VertexAttributes::Company(CompanyAttributes {
            isin: company.isin.clone(),
            price_from: company.price_from,
            price_to: company.price_to,
            price_change: company.price_change,
            currency: company.currency.clone(),
            market: company.market.clone(),
            source: company.source.clone(),
        }),
    });
    let keyword_vertices = document.keyword_nodes.iter().map(|keyword| Vertex {
        id: keyword.keyword.clone(),
        label: keyword.keyword.clone(),
        attributes: VertexAttributes::Keyword(KeywordAttributes {
            price_change: keyword.price_change,
        }),
    });

    for vertex in company_vertices.chain(keyword_vertices) {
        if index_by_id.contains_key(&vertex.id) {
            errors.push(GraphDataError::DuplicateVertex { id: vertex.id });
            continue;
        }
        index_by_id.insert(vertex.id.clone(), vertices.len());
        vertices.push(vertex);
    }

    let mut edges = Vec::with_capacity(document.edges.len());
    for record in &document.edges {
        match resolve_edge(record, &index_by_id) {
            Ok(edge) => edges.push(edge),
            Err(error) => errors.push(error),
        }
    }

    for error in &errors {
        warn!("graph data: {error}");
    }
    info!(
        "adapted graph: {} vertices, {} edges, {} records skipped",
        vertices.len(),
        edges.len(),
        errors.len()
    );

    AdaptedGraph {
        graph: MarketGraph {
            vertices,
            edges,
            index_by_id,
        },
        errors,
    }
}
