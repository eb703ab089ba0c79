mod adapt;
mod document;
mod fetch;
#[cfg(test)]
pub(crate) mod fixtures;
mod graph;
mod parse;

pub use adapt::{AdaptedGraph, adapt_document};
pub use document::GraphDocument;
pub use fetch::{GraphSource, load_graph_document};
pub use graph::{Edge, MarketGraph, SignFilter, Vertex, VertexAttributes, VertexKind};
