use crate::config::{CSV_WRITE_BUFFER, LINK_TYPE, PAGE_LABEL};
use crate::index::PageIndex;
use crate::stats::ExtractionStats;
use crate::targets::TargetMap;
use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;
use tracing::info;

pub const PAGES_CSV: &str = "pages.csv";
pub const LINKS_CSV: &str = "links.csv";

/// Paths to the three dump files the pipeline consumes.
#[derive(Debug, Clone)]
pub struct DumpPaths {
    pub pages: String,
    pub linktargets: String,
    pub pagelinks: String,
}

/// Runs the extraction stages in dependency order and writes the two CSV
/// artifacts. Each mapping structure is dropped as soon as the stage that
/// needs it completes; for a full English dump they are the dominant memory
/// cost.
pub fn run_extraction(paths: &DumpPaths, output_dir: &str) -> Result<ExtractionStats> {
    let mut stats = ExtractionStats::new();

    let pass = Instant::now();
    let index = PageIndex::build(&paths.pages, &mut stats)?;
    write_pages_csv(&index, output_dir)?;
    info!(duration_secs = pass.elapsed().as_secs_f64(), "Page pass complete");

    let pass = Instant::now();
    let targets = TargetMap::build(&paths.linktargets, &index, &mut stats)?;
    drop(index);
    info!(duration_secs = pass.elapsed().as_secs_f64(), "Target pass complete");

    let pass = Instant::now();
    write_links_csv(&paths.pagelinks, &targets, output_dir, &mut stats)?;
    drop(targets);
    info!(duration_secs = pass.elapsed().as_secs_f64(), "Link pass complete");

    stats.log_summary();
    Ok(stats)
}

fn csv_writer(path: &Path) -> Result<Writer<BufWriter<File>>> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(Writer::from_writer(BufWriter::with_capacity(
        CSV_WRITE_BUFFER,
        file,
    )))
}

/// One row per retained page, sorted by id so artifacts (and the node indices
/// assigned at load time) are reproducible across runs.
fn write_pages_csv(index: &PageIndex, output_dir: &str) -> Result<()> {
    let path = Path::new(output_dir).join(PAGES_CSV);
    let mut writer = csv_writer(&path)?;
    writer.write_record(["pageId", "title", "label"])?;

    let mut pages: Vec<(u32, &str)> = index.iter().collect();
    pages.sort_unstable();

    let mut id_buf = itoa::Buffer::new();
    for (id, title) in pages {
        writer.write_record([id_buf.format(id), title, PAGE_LABEL])?;
    }
    writer.flush()?;

    info!(path = %path.display(), pages = index.len(), "Pages artifact written");
    Ok(())
}

fn write_links_csv(
    pagelinks_path: &str,
    targets: &TargetMap,
    output_dir: &str,
    stats: &mut ExtractionStats,
) -> Result<()> {
    let path = Path::new(output_dir).join(LINKS_CSV);
    let mut writer = csv_writer(&path)?;
    writer.write_record(["startId", "endId", "relationshipType"])?;

    let mut from_buf = itoa::Buffer::new();
    let mut to_buf = itoa::Buffer::new();
    crate::edges::extract_edges(pagelinks_path, targets, stats, |edge| {
        writer.write_record([from_buf.format(edge.from), to_buf.format(edge.to), LINK_TYPE])?;
        Ok(())
    })?;
    writer.flush()?;

    info!(path = %path.display(), edges = stats.edges_written, "Links artifact written");
    Ok(())
}
