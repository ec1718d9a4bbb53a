use serde::Deserialize;

use crate::scanner::SqlValue;

/// A row from the page dump: surviving records become graph nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub id: u32,
    pub namespace: i64,
    pub title: String,
}

impl PageRecord {
    /// Decodes `(page_id, page_namespace, page_title, ...)`. Trailing columns
    /// (restrictions, touched timestamps, revision ids) are ignored.
    pub fn from_row(row: &[SqlValue]) -> Option<Self> {
        if row.len() < 3 {
            return None;
        }
        Some(Self {
            id: u32::try_from(row[0].as_int()?).ok()?,
            namespace: row[1].as_int()?,
            title: row[2].as_str()?.to_string(),
        })
    }
}

/// A row from the linktarget dump, mapping a surrogate id to a namespace+title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTargetRecord {
    pub target_id: u32,
    pub namespace: i64,
    pub title: String,
}

impl LinkTargetRecord {
    /// Decodes `(lt_id, lt_namespace, lt_title)`.
    pub fn from_row(row: &[SqlValue]) -> Option<Self> {
        if row.len() < 3 {
            return None;
        }
        Some(Self {
            target_id: u32::try_from(row[0].as_int()?).ok()?,
            namespace: row[1].as_int()?,
            title: row[2].as_str()?.to_string(),
        })
    }
}

/// A row from the pagelinks dump. The target is a surrogate that must be
/// resolved through the linktarget table before it names a real page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRecord {
    pub source_page_id: u32,
    pub target_ref_id: u32,
}

impl LinkRecord {
    /// Decodes both historical layouts: `(pl_from, pl_target_id)` and
    /// `(pl_from, pl_from_namespace, pl_target_id)` -- first and last column.
    pub fn from_row(row: &[SqlValue]) -> Option<Self> {
        if !(2..=3).contains(&row.len()) {
            return None;
        }
        Some(Self {
            source_page_id: u32::try_from(row[0].as_int()?).ok()?,
            target_ref_id: u32::try_from(row[row.len() - 1].as_int()?).ok()?,
        })
    }
}

/// A validated directed link between two canonical page ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: u32,
    pub to: u32,
}

/// Columns of the pages artifact (`pages.csv`) consumed at load time; the
/// constant label column is ignored.
#[derive(Debug, Deserialize)]
pub struct PageRow {
    #[serde(rename = "pageId")]
    pub page_id: u32,
    pub title: String,
}

/// Columns of the links artifact (`links.csv`) consumed at load time; the
/// constant relationship-type column is ignored.
#[derive(Debug, Deserialize)]
pub struct LinkRow {
    #[serde(rename = "startId")]
    pub start_id: u32,
    #[serde(rename = "endId")]
    pub end_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_record_from_row() {
        let r = vec![
            SqlValue::Int(7),
            SqlValue::Int(0),
            SqlValue::Text("Crater".into()),
        ];
        let page = PageRecord::from_row(&r).unwrap();
        assert_eq!(page.id, 7);
        assert_eq!(page.namespace, 0);
        assert_eq!(page.title, "Crater");
    }

    #[test]
    fn page_record_ignores_trailing_columns() {
        let r = vec![
            SqlValue::Int(7),
            SqlValue::Int(0),
            SqlValue::Text("Crater".into()),
            SqlValue::Text("".into()),
            SqlValue::Int(1),
        ];
        assert!(PageRecord::from_row(&r).is_some());
    }

    #[test]
    fn page_record_rejects_short_or_mistyped_rows() {
        assert!(PageRecord::from_row(&[SqlValue::Int(7), SqlValue::Int(0)]).is_none());
        let mistyped = vec![
            SqlValue::Text("7".into()),
            SqlValue::Int(0),
            SqlValue::Text("Crater".into()),
        ];
        assert!(PageRecord::from_row(&mistyped).is_none());
    }

    #[test]
    fn page_record_rejects_negative_id() {
        let r = vec![
            SqlValue::Int(-1),
            SqlValue::Int(0),
            SqlValue::Text("Crater".into()),
        ];
        assert!(PageRecord::from_row(&r).is_none());
    }

    #[test]
    fn link_record_two_column_layout() {
        let r = vec![SqlValue::Int(1), SqlValue::Int(42)];
        let link = LinkRecord::from_row(&r).unwrap();
        assert_eq!(link.source_page_id, 1);
        assert_eq!(link.target_ref_id, 42);
    }

    #[test]
    fn link_record_three_column_layout() {
        let r = vec![SqlValue::Int(1), SqlValue::Int(0), SqlValue::Int(42)];
        let link = LinkRecord::from_row(&r).unwrap();
        assert_eq!(link.source_page_id, 1);
        assert_eq!(link.target_ref_id, 42);
    }

    #[test]
    fn link_record_rejects_other_widths() {
        assert!(LinkRecord::from_row(&[SqlValue::Int(1)]).is_none());
        let wide = vec![
            SqlValue::Int(1),
            SqlValue::Int(0),
            SqlValue::Int(2),
            SqlValue::Int(3),
        ];
        assert!(LinkRecord::from_row(&wide).is_none());
    }

    #[test]
    fn link_target_record_from_row() {
        let r = vec![
            SqlValue::Int(9),
            SqlValue::Int(0),
            SqlValue::Text("Moon".into()),
        ];
        let lt = LinkTargetRecord::from_row(&r).unwrap();
        assert_eq!(lt.target_id, 9);
        assert_eq!(lt.title, "Moon");
    }
}
