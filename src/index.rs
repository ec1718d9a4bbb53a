use crate::config::{ARTICLE_NAMESPACE, PROGRESS_INTERVAL};
use crate::models::PageRecord;
use crate::scanner::DumpScanner;
use crate::stats::ExtractionStats;
use anyhow::Result;
use indicatif::ProgressBar;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use tracing::info;

/// Bidirectional title <-> page id mapping over the retained (namespace 0)
/// pages. Built once from the page dump, handed read-only to the link-target
/// pass, then dropped.
#[derive(Debug, Default)]
pub struct PageIndex {
    title_to_id: FxHashMap<String, u32>,
    id_to_title: FxHashMap<u32, String>,
}

impl PageIndex {
    /// Drains the page dump to completion. Later stages need the whole index,
    /// so there is no streaming handoff here.
    pub fn build(path: &str, stats: &mut ExtractionStats) -> Result<Self> {
        let mut scanner = DumpScanner::open(path)?;
        let pb = ProgressBar::new_spinner();
        let mut index = Self::default();

        info!("Building page index from: {}", path);

        for row in scanner.by_ref() {
            stats.pages_scanned += 1;
            let Some(record) = PageRecord::from_row(&row) else {
                stats.malformed_rows += 1;
                continue;
            };
            if record.namespace != ARTICLE_NAMESPACE {
                continue;
            }
            if index.insert(record) {
                stats.pages_kept += 1;
            } else {
                stats.duplicate_titles += 1;
            }
            if stats.pages_scanned % PROGRESS_INTERVAL == 0 {
                pb.tick();
            }
        }
        stats.malformed_rows += scanner.skipped_tuples();

        pb.finish_and_clear();
        info!(
            pages = index.len(),
            duplicates = stats.duplicate_titles,
            "Page index built"
        );
        Ok(index)
    }

    /// Inserts a record unless its title is already taken. First occurrence
    /// wins on duplicate titles -- an explicit tie-break, not an error.
    pub fn insert(&mut self, record: PageRecord) -> bool {
        match self.title_to_id.entry(record.title) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                self.id_to_title.insert(record.id, slot.key().clone());
                slot.insert(record.id);
                true
            }
        }
    }

    pub fn id_of(&self, title: &str) -> Option<u32> {
        self.title_to_id.get(title).copied()
    }

    pub fn title_of(&self, id: u32) -> Option<&str> {
        self.id_to_title.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.title_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.title_to_id.is_empty()
    }

    /// Retained pages in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.id_to_title.iter().map(|(id, title)| (*id, title.as_str()))
    }
}
