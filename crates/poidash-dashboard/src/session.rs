//! The dashboard session: the single owner of the POI list snapshot, the
//! selection, and the map view state.

use std::collections::HashSet;

use chrono::Utc;
use poidash_core::{validate_upload, Poi};
use poidash_store::{PoiStoreClient, ReviewAction, ReviewOutcome, StoreError};

use crate::map_view::{popup_for, FeatureProperties, MapCanvas, MapView, SyncOutcome};
use crate::table::{table_rows, SortSpec, TableRow};
use crate::viewport::LngLat;
use crate::{DashboardError, InFlightFlag, Notice, PoiDetail, SelectionState};

#[derive(Debug, Default)]
pub struct Dashboard {
    pois: Vec<Poi>,
    selection: SelectionState,
    map: MapView,
    review_flag: InFlightFlag,
    upload_flag: InFlightFlag,
}

impl Dashboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_pois(pois: Vec<Poi>) -> Self {
        let mut dashboard = Self::new();
        dashboard.replace_pois(pois);
        dashboard
    }

    #[must_use]
    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    #[must_use]
    pub fn map(&self) -> &MapView {
        &self.map
    }

    /// Flag backing the approve/reject buttons.
    #[must_use]
    pub fn review_flag(&self) -> &InFlightFlag {
        &self.review_flag
    }

    /// Flag backing the photo upload button.
    #[must_use]
    pub fn upload_flag(&self) -> &InFlightFlag {
        &self.upload_flag
    }

    /// Installs a freshly loaded POI list.
    ///
    /// Ids must be unique within a set; later duplicates are dropped. A
    /// selection pointing at an id that is no longer present is cleared.
    /// Returns the number of dropped duplicates.
    pub fn replace_pois(&mut self, pois: Vec<Poi>) -> usize {
        let total = pois.len();
        let mut seen = HashSet::with_capacity(total);
        self.pois = pois
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();

        let duplicates = total - self.pois.len();
        if duplicates > 0 {
            tracing::warn!(duplicates, "dropped POIs with duplicate ids");
        }

        if let Some(id) = self.selection.selected() {
            if !self.contains(id) {
                tracing::debug!(poi_id = id, "selected POI no longer present, clearing selection");
                self.selection.clear();
            }
        }
        duplicates
    }

    /// Toggles selection of `id` (table row or map marker click).
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnknownPoi`] if `id` is not in the list.
    pub fn select(&mut self, id: &str) -> Result<Option<&str>, DashboardError> {
        if !self.contains(id) {
            return Err(DashboardError::UnknownPoi { id: id.to_string() });
        }
        Ok(self.selection.toggle(id))
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    #[must_use]
    pub fn selected_poi(&self) -> Option<&Poi> {
        self.selection.selected().and_then(|id| self.find(id))
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Poi> {
        self.pois.iter().find(|p| p.id == id)
    }

    fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    #[must_use]
    pub fn rows(&self, sort: Option<SortSpec>) -> Vec<TableRow> {
        table_rows(&self.pois, &self.selection, sort)
    }

    #[must_use]
    pub fn detail(&self, id: &str) -> Option<PoiDetail> {
        self.find(id).map(PoiDetail::from)
    }

    /// Applies a review result to the local list.
    ///
    /// The POI stays in the list and is relabelled: with the store's record
    /// when one came back, otherwise with the local copy. Either way the
    /// status is the one the review requested, even if the store echoed a
    /// stale record.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnknownPoi`] if the id is not in the list.
    pub fn apply_review(&mut self, outcome: &ReviewOutcome) -> Result<&Poi, DashboardError> {
        let slot = self
            .pois
            .iter_mut()
            .find(|p| p.id == outcome.id)
            .ok_or_else(|| DashboardError::UnknownPoi {
                id: outcome.id.clone(),
            })?;

        let now = Utc::now();
        *slot = match &outcome.record {
            Some(record) if record.id == outcome.id => Poi {
                status: outcome.status,
                updated_at: record.updated_at.or(Some(now)),
                ..record.clone()
            },
            _ => slot.with_status(outcome.status, now),
        };
        Ok(slot)
    }

    /// Sends a review command to the store and patches the local copy.
    ///
    /// Always returns a notice; the review flag is held for the duration of
    /// the request and released on every exit path.
    pub async fn review(
        &mut self,
        store: &PoiStoreClient,
        id: &str,
        action: ReviewAction,
    ) -> Notice {
        let flag = self.review_flag.clone();
        let Some(_guard) = flag.try_begin() else {
            return Notice::error("a review is already in progress");
        };

        if !self.contains(id) {
            return Notice::error(format!("POI {id} is not in the current list"));
        }

        match store.review(id, action).await {
            Ok(outcome) => match self.apply_review(&outcome) {
                Ok(poi) => Notice::success(format!(
                    "{} marked {}",
                    display_name(poi),
                    poi.status.as_str()
                )),
                Err(e) => Notice::error(e.to_string()),
            },
            Err(StoreError::NotFound { id }) => {
                Notice::error(format!("POI {id} was not found in the store"))
            }
            Err(e) => {
                tracing::error!(poi_id = id, %action, error = %e, "review command failed");
                Notice::error(format!("failed to {action} POI {id}"))
            }
        }
    }

    /// Validates and uploads an operator photo, then reloads the list so
    /// POIs extracted from it show up.
    ///
    /// The upload flag is held until the reload finishes. A failed reload
    /// keeps the current list and is only logged.
    pub async fn upload(
        &mut self,
        store: &PoiStoreClient,
        filename: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
        latitude: &str,
        longitude: &str,
    ) -> Notice {
        let flag = self.upload_flag.clone();
        let Some(_guard) = flag.try_begin() else {
            return Notice::error("an upload is already in progress");
        };

        let form = match validate_upload(filename, content_type, bytes, latitude, longitude) {
            Ok(form) => form,
            Err(e) => return Notice::error(e.to_string()),
        };

        if let Err(e) = store.upload(form).await {
            tracing::error!(filename, error = %e, "photo upload failed");
            return Notice::error("Failed to process image");
        }

        match store.list_pois().await {
            Ok(pois) => {
                self.replace_pois(pois);
            }
            Err(e) => tracing::warn!(error = %e, "reload after upload failed"),
        }
        Notice::success("POI extraction completed")
    }

    /// Re-renders the map for the current list and selection.
    ///
    /// # Errors
    ///
    /// Propagates canvas failures from [`MapView::sync`].
    pub fn sync_map(&mut self, canvas: &mut dyn MapCanvas) -> Result<SyncOutcome, DashboardError> {
        self.map.sync(canvas, &self.pois, &self.selection)
    }

    /// Completes the marker icon load and renders whatever was deferred.
    ///
    /// # Errors
    ///
    /// Propagates canvas failures from [`MapView::sync`].
    pub fn icon_loaded(
        &mut self,
        canvas: &mut dyn MapCanvas,
        image: Result<Vec<u8>, String>,
    ) -> Result<SyncOutcome, DashboardError> {
        self.map.finish_icon_load(canvas, image);
        self.sync_map(canvas)
    }

    /// Handles a click on a rendered marker: shows the info popup and returns
    /// the clicked POI id. Selection is left untouched.
    ///
    /// # Errors
    ///
    /// - [`DashboardError::InvalidFeature`] if the properties do not decode.
    /// - [`DashboardError::UnknownPoi`] if the feature's id is not in the list.
    pub fn marker_clicked(
        &self,
        canvas: &mut dyn MapCanvas,
        at: LngLat,
        properties: &serde_json::Value,
    ) -> Result<String, DashboardError> {
        let properties: FeatureProperties = serde_json::from_value(properties.clone())
            .map_err(DashboardError::InvalidFeature)?;
        if !self.contains(&properties.id) {
            return Err(DashboardError::UnknownPoi { id: properties.id });
        }
        canvas.show_popup(at, &popup_for(&properties));
        Ok(properties.id)
    }
}

fn display_name(poi: &Poi) -> &str {
    if poi.name.is_empty() {
        &poi.id
    } else {
        &poi.name
    }
}

#[cfg(test)]
mod tests {
    use poidash_core::PoiStatus;

    use super::*;
    use crate::map_view::MapMode;
    use crate::testing::{poi, CanvasCall, RecordingCanvas};

    fn sample() -> Dashboard {
        Dashboard::with_pois(vec![
            poi("1", 23.8, 90.4),
            poi("2", 23.9, 90.5),
            poi("3", 23.7, 90.3),
        ])
    }

    #[test]
    fn duplicate_ids_keep_first_record() {
        let mut first = poi("1", 23.8, 90.4);
        first.name = "first".to_string();
        let mut dup = poi("1", 0.0, 0.0);
        dup.name = "dup".to_string();

        let mut dashboard = Dashboard::new();
        assert_eq!(dashboard.replace_pois(vec![first, dup, poi("2", 1.0, 1.0)]), 1);
        assert_eq!(dashboard.pois().len(), 2);
        assert_eq!(dashboard.find("1").map(|p| p.name.as_str()), Some("first"));
    }

    #[test]
    fn reload_clears_vanished_selection() {
        let mut dashboard = sample();
        dashboard.select("2").expect("known id");
        dashboard.replace_pois(vec![poi("1", 23.8, 90.4)]);
        assert_eq!(dashboard.selection().selected(), None);

        dashboard.select("1").expect("known id");
        dashboard.replace_pois(vec![poi("1", 23.8, 90.4), poi("5", 1.0, 1.0)]);
        assert_eq!(dashboard.selection().selected(), Some("1"));
    }

    #[test]
    fn select_toggles_and_rejects_unknown_ids() {
        let mut dashboard = sample();
        assert_eq!(dashboard.select("1").expect("known"), Some("1"));
        assert_eq!(dashboard.select("2").expect("known"), Some("2"));
        assert_eq!(dashboard.selected_poi().map(|p| p.id.as_str()), Some("2"));
        assert_eq!(dashboard.select("2").expect("known"), None);
        assert!(matches!(
            dashboard.select("nope"),
            Err(DashboardError::UnknownPoi { .. })
        ));
    }

    #[test]
    fn table_and_map_agree_on_selection() {
        let mut dashboard = sample();
        let mut canvas = RecordingCanvas::ready();
        dashboard
            .icon_loaded(&mut canvas, Ok(vec![1]))
            .expect("initial render");

        dashboard.select("3").expect("known");
        let outcome = dashboard.sync_map(&mut canvas).expect("sync");

        let marked: Vec<_> = dashboard
            .rows(None)
            .into_iter()
            .filter(|r| r.is_selected)
            .map(|r| r.id)
            .collect();
        assert_eq!(marked, vec!["3".to_string()]);
        assert!(matches!(
            outcome,
            SyncOutcome::Rendered { mode: MapMode::Focus(ref id), visible: 1, .. } if id == "3"
        ));

        dashboard.clear_selection();
        let outcome = dashboard.sync_map(&mut canvas).expect("sync");
        assert!(matches!(
            outcome,
            SyncOutcome::Rendered {
                mode: MapMode::Overview,
                visible: 3,
                ..
            }
        ));
        assert!(dashboard.rows(None).iter().all(|r| !r.is_selected));
    }

    #[test]
    fn icon_load_renders_deferred_state() {
        let mut dashboard = sample();
        let mut canvas = RecordingCanvas::ready();
        assert_eq!(
            dashboard.sync_map(&mut canvas).expect("sync"),
            SyncOutcome::Deferred
        );
        let outcome = dashboard
            .icon_loaded(&mut canvas, Ok(vec![1]))
            .expect("render");
        assert!(matches!(outcome, SyncOutcome::Rendered { visible: 3, .. }));
        assert!(dashboard.map().layers_initialized());
    }

    #[test]
    fn marker_click_shows_popup_without_selecting() {
        let dashboard = sample();
        let mut canvas = RecordingCanvas::ready();
        let properties = serde_json::json!({
            "id": "2",
            "name": "POI 2",
            "address": "2 Main St",
            "status": "pending",
            "index": 1,
            "isSelected": false
        });

        let id = dashboard
            .marker_clicked(&mut canvas, LngLat { lng: 90.5, lat: 23.9 }, &properties)
            .expect("click resolves");
        assert_eq!(id, "2");
        assert_eq!(dashboard.selection().selected(), None);
        let popups = canvas.popups();
        assert_eq!(popups.len(), 1);
        assert_eq!(popups[0].status_label, "Pending");
        assert_eq!(canvas.count(|c| matches!(c, CanvasCall::Animate(_))), 0);
    }

    #[test]
    fn marker_click_with_bad_properties_fails() {
        let dashboard = sample();
        let mut canvas = RecordingCanvas::ready();
        let at = LngLat { lng: 0.0, lat: 0.0 };

        assert!(matches!(
            dashboard.marker_clicked(&mut canvas, at, &serde_json::json!({"name": "x"})),
            Err(DashboardError::InvalidFeature(_))
        ));
        assert!(matches!(
            dashboard.marker_clicked(&mut canvas, at, &serde_json::json!({"id": "99"})),
            Err(DashboardError::UnknownPoi { .. })
        ));
        assert!(canvas.popups().is_empty());
    }

    #[test]
    fn apply_review_relabels_without_removing() {
        let mut dashboard = sample();
        let outcome = ReviewOutcome {
            id: "2".to_string(),
            status: PoiStatus::Approved,
            record: None,
        };
        let patched = dashboard.apply_review(&outcome).expect("known id");
        assert_eq!(patched.status, PoiStatus::Approved);
        assert!(patched.updated_at.is_some());
        assert_eq!(dashboard.pois().len(), 3);
    }

    #[test]
    fn apply_review_prefers_store_record() {
        let mut dashboard = sample();
        let mut record = poi("1", 23.8, 90.4);
        record.name = "Renamed by store".to_string();
        record.status = PoiStatus::Rejected;

        let outcome = ReviewOutcome {
            id: "1".to_string(),
            status: PoiStatus::Rejected,
            record: Some(record),
        };
        let patched = dashboard.apply_review(&outcome).expect("known id");
        assert_eq!(patched.name, "Renamed by store");
        assert_eq!(patched.status, PoiStatus::Rejected);
    }

    #[test]
    fn apply_review_overrides_stale_store_status() {
        let mut dashboard = sample();
        let mut record = poi("1", 23.8, 90.4);
        record.name = "Renamed by store".to_string();
        record.status = PoiStatus::Pending;
        record.updated_at = None;

        let outcome = ReviewOutcome {
            id: "1".to_string(),
            status: PoiStatus::Approved,
            record: Some(record),
        };
        let patched = dashboard.apply_review(&outcome).expect("known id");
        assert_eq!(patched.name, "Renamed by store");
        assert_eq!(patched.status, PoiStatus::Approved);
        assert!(patched.updated_at.is_some());
    }

    #[test]
    fn apply_review_of_unknown_id_fails() {
        let mut dashboard = sample();
        let outcome = ReviewOutcome {
            id: "zzz".to_string(),
            status: PoiStatus::Approved,
            record: None,
        };
        assert!(matches!(
            dashboard.apply_review(&outcome),
            Err(DashboardError::UnknownPoi { .. })
        ));
    }
}
