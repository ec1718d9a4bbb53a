use crate::config::PROGRESS_INTERVAL;
use crate::models::{Edge, LinkRecord};
use crate::scanner::DumpScanner;
use crate::stats::ExtractionStats;
use crate::targets::TargetMap;
use anyhow::Result;
use indicatif::ProgressBar;
use tracing::info;

/// Resolves one link record through the target map. Links whose surrogate is
/// unmapped point at filtered or broken targets and yield nothing.
pub fn resolve_link(record: LinkRecord, targets: &TargetMap) -> Option<Edge> {
    targets.resolve(record.target_ref_id).map(|to| Edge {
        from: record.source_page_id,
        to,
    })
}

/// Drains the pagelinks dump, feeding each validated edge to `sink`. The
/// source id is not validated here; graph insertion treats an unknown
/// endpoint as a no-op.
pub fn extract_edges<F>(
    path: &str,
    targets: &TargetMap,
    stats: &mut ExtractionStats,
    mut sink: F,
) -> Result<()>
where
    F: FnMut(Edge) -> Result<()>,
{
    let mut scanner = DumpScanner::open(path)?;
    let pb = ProgressBar::new_spinner();

    info!("Extracting link edges from: {}", path);

    for row in scanner.by_ref() {
        stats.links_scanned += 1;
        let Some(record) = LinkRecord::from_row(&row) else {
            stats.malformed_rows += 1;
            continue;
        };
        match resolve_link(record, targets) {
            Some(edge) => {
                sink(edge)?;
                stats.edges_written += 1;
            }
            None => stats.unresolved_links += 1,
        }
        if stats.links_scanned % PROGRESS_INTERVAL == 0 {
            pb.tick();
        }
    }
    stats.malformed_rows += scanner.skipped_tuples();

    pb.finish_and_clear();
    info!(
        edges = stats.edges_written,
        unresolved = stats.unresolved_links,
        "Link edges extracted"
    );
    Ok(())
}
