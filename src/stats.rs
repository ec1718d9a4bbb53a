use tracing::info;

/// Counters collected across the extraction stages. Per-record failures are
/// never fatal, so these are the only trace they leave.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractionStats {
    pub pages_scanned: u64,
    pub pages_kept: u64,
    pub duplicate_titles: u64,
    pub targets_scanned: u64,
    pub targets_mapped: u64,
    pub links_scanned: u64,
    pub edges_written: u64,
    pub unresolved_links: u64,
    pub malformed_rows: u64,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows dropped for any per-record reason (not counting namespace filters,
    /// which are expected rather than anomalous).
    pub fn dropped(&self) -> u64 {
        self.malformed_rows + self.unresolved_links
    }

    pub fn log_summary(&self) {
        info!(
            pages_kept = self.pages_kept,
            duplicate_titles = self.duplicate_titles,
            targets_mapped = self.targets_mapped,
            edges_written = self.edges_written,
            unresolved_links = self.unresolved_links,
            malformed_rows = self.malformed_rows,
            "Extraction finished"
        );
    }
}
