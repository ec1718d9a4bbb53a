/// Namespace identifier for primary encyclopedic articles
pub const ARTICLE_NAMESPACE: i64 = 0;

/// Progress update interval (tick every N rows)
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Buffer size for CSV writers
pub const CSV_WRITE_BUFFER: usize = 128 * 1024;

/// Node label written to the pages artifact
pub const PAGE_LABEL: &str = "Page";

/// Relationship type written to the links artifact
pub const LINK_TYPE: &str = "LINKS_TO";
