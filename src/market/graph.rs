use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexKind {
    Company,
    Keyword,
}

impl VertexKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Keyword => "keyword",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompanyAttributes {
    pub isin: String,
    pub price_from: f64,
    pub price_to: f64,
    pub price_change: f64,
    pub currency: String,
    pub market: String,
    pub source: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeywordAttributes {
    pub price_change: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum VertexAttributes {
    Company(CompanyAttributes),
    Keyword(KeywordAttributes),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub id: String,
    pub label: String,
    pub attributes: VertexAttributes,
}

impl Vertex {
    pub fn kind(&self) -> VertexKind {
        match self.attributes {
            VertexAttributes::Company(_) => VertexKind::Company,
            VertexAttributes::Keyword(_) => VertexKind::Keyword,
        }
    }

    pub fn price_change(&self) -> f64 {
        match &self.attributes {
            VertexAttributes::Company(company) => company.price_change,
            VertexAttributes::Keyword(keyword) => keyword.price_change,
        }
    }
}

/// A relation whose endpoints both resolved to vertices of the same graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SignFilter {
    #[default]
    Positive,
    Negative,
}

impl SignFilter {
    pub fn keeps(self, weight: f64) -> bool {
        match self {
            Self::Positive => weight > 0.0,
            Self::Negative => weight < 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MarketGraph {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub index_by_id: HashMap<String, usize>,
}

impl MarketGraph {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.index_by_id
            .get(id)
            .and_then(|&index| self.vertices.get(index))
    }

    /// Indices into `edges` of the relations kept by `filter`.
    pub fn visible_edges(&self, filter: SignFilter) -> Vec<usize> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| filter.keeps(edge.weight))
            .map(|(index, _)| index)
            .collect()
    }
}
