//! Review-session state for the POI dashboard.
//!
//! The map and the table never talk to each other. Both render from state
//! owned by [`Dashboard`]: the POI list snapshot and the single
//! [`SelectionState`]. The map side is a small state machine ([`MapView`])
//! driving an abstract [`MapCanvas`] so it can be exercised without a
//! browser.

pub mod detail;
pub mod error;
pub mod in_flight;
pub mod map_view;
pub mod notify;
pub mod selection;
pub mod session;
pub mod table;
pub mod viewport;

#[cfg(test)]
pub(crate) mod testing;

pub use detail::PoiDetail;
pub use error::DashboardError;
pub use in_flight::{InFlightFlag, InFlightGuard};
pub use map_view::{
    popup_for, FallbackMarker, FeatureCollection, FeatureProperties, IconState, MapCanvas,
    MapMode, MapPlan, MapView, Popup, SymbolLayer, SyncOutcome,
};
pub use notify::{Notice, NoticeLevel};
pub use selection::SelectionState;
pub use session::Dashboard;
pub use table::{table_rows, SortColumn, SortDirection, SortSpec, TableRow, TABLE_COLUMNS};
pub use viewport::{bounding_box, BoundingBox, LngLat, ViewportCommand};
