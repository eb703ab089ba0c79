use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use super::document::GraphDocument;
use super::parse::parse_graph_document;

/// Where the graph document is read from.
#[derive(Clone, Debug)]
pub enum GraphSource {
    Endpoint(String),
    File(PathBuf),
}

impl GraphSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Endpoint(url) => url.clone(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

fn fetch_body(url: &str) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    client
        .get(url)
        .send()
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()
        .with_context(|| format!("{url} returned an error status"))?
        .text()
        .with_context(|| format!("response body from {url} was not valid text"))
}

pub fn load_graph_document(source: &GraphSource) -> Result<GraphDocument> {
    let raw = match source {
        GraphSource::Endpoint(url) => fetch_body(url)?,
        GraphSource::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read graph document {}", path.display()))?,
    };

    let document = parse_graph_document(&raw)
        .with_context(|| format!("failed to parse graph document from {}", source.describe()))?;

    info!(
        "loaded graph document from {}: {} companies, {} keywords, {} edges",
        source.describe(),
        document.company_nodes.len(),
        document.keyword_nodes.len(),
        document.edges.len()
    );

    Ok(document)
}
