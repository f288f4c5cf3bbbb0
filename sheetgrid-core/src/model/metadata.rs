use crate::reader::MergeRegion;
use serde::Serialize;
use std::collections::BTreeMap;

use super::row::field_name;

/// Per-row rendering hints for merged regions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowMetadata {
    /// Keyed by the field of the merge's first column ("c2")
    pub columns: BTreeMap<String, ColumnMetadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnMetadata {
    /// Number of columns the cell spans
    pub colspan: u32,
    /// The merged region continues below this row
    #[serde(rename = "mergeDown")]
    pub merge_down: bool,
}

impl RowMetadata {
    pub fn column(&self, column_id: &str) -> Option<&ColumnMetadata> {
        self.columns.get(column_id)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Collect the merges covering `row`.
///
/// Regions are scanned in order; when two start in the same column the later
/// one wins.
pub fn row_metadata(merges: &[MergeRegion], row: u32) -> RowMetadata {
    let mut metadata = RowMetadata::default();
    for merge in merges.iter().filter(|merge| merge.contains_row(row)) {
        let multi_row = merge.end.row > merge.start.row;
        metadata.columns.insert(
            field_name(merge.start.col),
            ColumnMetadata {
                colspan: merge.end.col.saturating_sub(merge.start.col).saturating_add(1),
                merge_down: multi_row && row < merge.end.row,
            },
        );
    }
    metadata
}
