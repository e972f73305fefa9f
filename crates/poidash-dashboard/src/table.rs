//! Row model for the POI data table.
//!
//! Rows are rebuilt from the POI list and the shared selection on every
//! render; the table keeps no selection state of its own.

use std::cmp::Ordering;

use poidash_core::Poi;
use serde::Serialize;

use crate::SelectionState;

pub const TABLE_COLUMNS: [&str; 5] = ["Name", "Address", "Image", "Status", "Actions"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Address,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    #[must_use]
    pub fn ascending(column: SortColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    #[must_use]
    pub fn descending(column: SortColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Descending,
        }
    }

    fn compare(self, a: &Poi, b: &Poi) -> Ordering {
        let ordering = match self.column {
            SortColumn::Name => cmp_text(&a.name, &b.name),
            SortColumn::Address => cmp_text(&a.address, &b.address),
            SortColumn::Status => a.status.as_str().cmp(b.status.as_str()),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub id: String,
    pub name: String,
    pub address: String,
    pub image: Option<String>,
    pub status_label: &'static str,
    pub is_selected: bool,
}

impl TableRow {
    fn new(poi: &Poi, selection: &SelectionState) -> Self {
        Self {
            id: poi.id.clone(),
            name: poi.name.clone(),
            address: poi.address.clone(),
            image: poi.image.clone(),
            status_label: poi.status.label(),
            is_selected: selection.is_selected(&poi.id),
        }
    }
}

/// Builds table rows, optionally sorted. The sort is stable, so equal keys
/// keep their load order.
#[must_use]
pub fn table_rows(pois: &[Poi], selection: &SelectionState, sort: Option<SortSpec>) -> Vec<TableRow> {
    let mut ordered: Vec<&Poi> = pois.iter().collect();
    if let Some(spec) = sort {
        ordered.sort_by(|a, b| spec.compare(a, b));
    }
    ordered
        .into_iter()
        .map(|poi| TableRow::new(poi, selection))
        .collect()
}
