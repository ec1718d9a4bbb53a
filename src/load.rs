use crate::graph::WikiGraph;
use crate::models::{Edge, LinkRow, PageRow};
use anyhow::{Context, Result};
use csv::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// What graph construction kept and what it refused.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub nodes: usize,
    pub edges: usize,
    /// Link rows with an endpoint missing from the pages artifact.
    pub skipped_edges: u64,
}

/// Builds the in-memory graph from the two CSV artifacts. Edge rows are
/// collected and inserted in bulk; rows referencing unknown pages are skipped
/// and counted, never fatal.
pub fn build_graph(pages_path: &Path, links_path: &Path) -> Result<(WikiGraph, LoadReport)> {
    let mut graph = WikiGraph::new();
    let mut report = LoadReport::default();

    let mut pages = open_csv(pages_path)?;
    for row in pages.deserialize() {
        let row: PageRow = row.with_context(|| format!("Bad row in {}", pages_path.display()))?;
        graph.add_node(row.page_id, &row.title);
    }
    report.nodes = graph.node_count();
    info!(nodes = report.nodes, "Pages loaded");

    let mut links = open_csv(links_path)?;
    let mut pending = Vec::new();
    for row in links.deserialize() {
        let row: LinkRow = row.with_context(|| format!("Bad row in {}", links_path.display()))?;
        if graph.contains_page(row.start_id) && graph.contains_page(row.end_id) {
            pending.push(Edge {
                from: row.start_id,
                to: row.end_id,
            });
        } else {
            report.skipped_edges += 1;
        }
    }
    graph.add_edges_from(pending);
    report.edges = graph.edge_count();

    info!(
        edges = report.edges,
        skipped = report.skipped_edges,
        "Graph ready"
    );
    Ok((graph, report))
}

fn open_csv(path: &Path) -> Result<Reader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(Reader::from_reader(BufReader::new(file)))
}
