use crate::config::{ARTICLE_NAMESPACE, PROGRESS_INTERVAL};
use crate::index::PageIndex;
use crate::models::LinkTargetRecord;
use crate::scanner::DumpScanner;
use crate::stats::ExtractionStats;
use anyhow::Result;
use indicatif::ProgressBar;
use rustc_hash::FxHashMap;
use tracing::info;

/// Maps link-target surrogate ids to canonical page ids. Link records never
/// name their destination page directly; they go through this table.
#[derive(Debug, Default)]
pub struct TargetMap {
    map: FxHashMap<u32, u32>,
}

impl TargetMap {
    /// Drains the linktarget dump against a completed page index. Targets
    /// whose title is not a retained page are dropped silently -- that is the
    /// expected filtering of links pointing outside the article namespace.
    pub fn build(path: &str, index: &PageIndex, stats: &mut ExtractionStats) -> Result<Self> {
        let mut scanner = DumpScanner::open(path)?;
        let pb = ProgressBar::new_spinner();
        let mut targets = Self::default();

        info!("Resolving link targets from: {}", path);

        for row in scanner.by_ref() {
            stats.targets_scanned += 1;
            let Some(record) = LinkTargetRecord::from_row(&row) else {
                stats.malformed_rows += 1;
                continue;
            };
            if targets.insert(record, index) {
                stats.targets_mapped += 1;
            }
            if stats.targets_scanned % PROGRESS_INTERVAL == 0 {
                pb.tick();
            }
        }
        stats.malformed_rows += scanner.skipped_tuples();

        pb.finish_and_clear();
        info!(mapped = targets.len(), "Link targets resolved");
        Ok(targets)
    }

    /// Records `target_id -> page_id` when the target names a retained page.
    pub fn insert(&mut self, record: LinkTargetRecord, index: &PageIndex) -> bool {
        if record.namespace != ARTICLE_NAMESPACE {
            return false;
        }
        match index.id_of(&record.title) {
            Some(page_id) => {
                self.map.insert(record.target_id, page_id);
                true
            }
            None => false,
        }
    }

    pub fn resolve(&self, target_id: u32) -> Option<u32> {
        self.map.get(&target_id).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
