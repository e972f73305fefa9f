//! Map view synchronization.
//!
//! One state machine with two modes replaces separate "all POIs" and
//! "selected POI" render paths:
//!
//! - [`MapMode::Overview`]: every POI with valid coordinates is shown and the
//!   viewport fits their bounding box.
//! - [`MapMode::Focus`]: only the selected POI is shown and the viewport flies
//!   to it.
//!
//! The canvas is an owned handle passed into [`MapView::sync`]. The source
//! and each symbol layer are registered once and tracked individually; later
//! syncs replace the source data and only retry layers that never made it.

use poidash_core::{Poi, PoiStatus};
use serde::{Deserialize, Serialize};

use crate::viewport::{bounding_box, LngLat, ViewportCommand};
use crate::{DashboardError, SelectionState};

pub const POI_SOURCE_ID: &str = "pois";
pub const ICON_NAME: &str = "poi_icon";
pub const ICON_SELECTED_NAME: &str = "poi_icon_selected";

/// Pin colors used when the custom marker icon could not be loaded.
pub const FALLBACK_COLORS: [&str; 2] = ["#00A79D", "#FF0000"];

/// Symbol layers registered on first render: regular POIs and the selected POI.
pub const SYMBOL_LAYERS: [SymbolLayer; 2] = [
    SymbolLayer {
        id: "poi-icons",
        source: POI_SOURCE_ID,
        icon: ICON_NAME,
        selected_only: false,
        text_size: 11.0,
        text_color: "#374151",
    },
    SymbolLayer {
        id: "poi-icons-selected",
        source: POI_SOURCE_ID,
        icon: ICON_SELECTED_NAME,
        selected_only: true,
        text_size: 13.0,
        text_color: "#DC2626",
    },
];

/// Rendering backend for the map. Implementations must let a new
/// [`MapCanvas::animate`] call supersede any animation still running.
pub trait MapCanvas {
    fn is_style_loaded(&self) -> bool;

    /// # Errors
    ///
    /// Returns [`DashboardError::Canvas`] if the image is rejected.
    fn add_icon(&mut self, name: &str, image: &[u8]) -> Result<(), DashboardError>;

    /// # Errors
    ///
    /// Returns [`DashboardError::Canvas`] if the source cannot be created.
    fn add_source(&mut self, id: &str, data: &FeatureCollection) -> Result<(), DashboardError>;

    /// # Errors
    ///
    /// Returns [`DashboardError::Canvas`] if the source does not exist.
    fn set_source_data(&mut self, id: &str, data: &FeatureCollection)
        -> Result<(), DashboardError>;

    /// # Errors
    ///
    /// Returns [`DashboardError::Canvas`] if the layer cannot be created.
    fn add_layer(&mut self, layer: &SymbolLayer) -> Result<(), DashboardError>;

    /// Replaces every fallback pin with `markers`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Canvas`] if the markers cannot be placed.
    fn set_fallback_markers(&mut self, markers: &[FallbackMarker]) -> Result<(), DashboardError>;

    fn animate(&mut self, command: &ViewportCommand);

    fn show_popup(&mut self, at: LngLat, popup: &Popup);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SymbolLayer {
    pub id: &'static str,
    pub source: &'static str,
    pub icon: &'static str,
    /// `true` renders only features with `isSelected`, `false` only the others.
    pub selected_only: bool,
    pub text_size: f64,
    pub text_color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FallbackMarker {
    pub position: LngLat,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconState {
    #[default]
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapMode {
    Overview,
    Focus(String),
}

/// Properties carried by every rendered feature; a marker click hands them
/// back to [`popup_for`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProperties {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: PoiStatus,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: PointGeometry,
    pub properties: FeatureProperties,
}

/// GeoJSON `FeatureCollection` of point features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    fn from_pois(pois: &[&Poi], selection: &SelectionState) -> Self {
        let features = pois
            .iter()
            .enumerate()
            .map(|(index, poi)| Feature {
                kind: "Feature",
                geometry: PointGeometry {
                    kind: "Point",
                    coordinates: [poi.longitude, poi.latitude],
                },
                properties: FeatureProperties {
                    id: poi.id.clone(),
                    name: poi.name.clone(),
                    address: poi.address.clone(),
                    status: poi.status,
                    index,
                    is_selected: selection.is_selected(&poi.id),
                },
            })
            .collect();
        Self {
            kind: "FeatureCollection",
            features,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Info overlay shown for a clicked marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub name: String,
    pub address: String,
    pub status_label: String,
    pub is_selected: bool,
}

#[must_use]
pub fn popup_for(properties: &FeatureProperties) -> Popup {
    Popup {
        name: properties.name.clone(),
        address: properties.address.clone(),
        status_label: properties.status.label().to_string(),
        is_selected: properties.is_selected,
    }
}

/// What the map should show for a given POI list and selection.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPlan {
    pub mode: MapMode,
    pub features: FeatureCollection,
    /// `None` when nothing is visible.
    pub command: Option<ViewportCommand>,
    /// POIs left off the map because of invalid coordinates.
    pub dropped: usize,
}

impl MapPlan {
    #[must_use]
    pub fn compute(pois: &[Poi], selection: &SelectionState) -> Self {
        let focused = selection
            .selected()
            .and_then(|id| pois.iter().find(|p| p.id == id));

        let (mode, candidates): (MapMode, Vec<&Poi>) = match focused {
            Some(poi) => (MapMode::Focus(poi.id.clone()), vec![poi]),
            None => (MapMode::Overview, pois.iter().collect()),
        };

        let total = candidates.len();
        let visible: Vec<&Poi> = candidates
            .into_iter()
            .filter(|p| p.has_valid_coordinates())
            .collect();
        let dropped = total - visible.len();

        let command = match mode {
            MapMode::Focus(_) => visible
                .first()
                .map(|p| ViewportCommand::focus(LngLat::of(p))),
            MapMode::Overview => bounding_box(visible.iter().map(|p| LngLat::of(p)))
                .map(ViewportCommand::overview),
        };

        Self {
            mode,
            features: FeatureCollection::from_pois(&visible, selection),
            command,
            dropped,
        }
    }

    fn fallback_markers(&self) -> Vec<FallbackMarker> {
        self.features
            .features
            .iter()
            .enumerate()
            .map(|(idx, f)| FallbackMarker {
                position: LngLat {
                    lng: f.geometry.coordinates[0],
                    lat: f.geometry.coordinates[1],
                },
                color: FALLBACK_COLORS[idx % FALLBACK_COLORS.len()],
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Style or marker icon not ready yet; nothing was touched.
    Deferred,
    Rendered {
        mode: MapMode,
        visible: usize,
        command: Option<ViewportCommand>,
    },
}

#[derive(Debug, Default)]
pub struct MapView {
    icon: IconState,
    source_added: bool,
    registered_layers: Vec<&'static str>,
}

impl MapView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn icon_state(&self) -> IconState {
        self.icon
    }

    #[must_use]
    pub fn layers_initialized(&self) -> bool {
        self.source_added
            && SYMBOL_LAYERS
                .iter()
                .all(|layer| self.registered_layers.contains(&layer.id))
    }

    /// Records the result of the asynchronous marker icon load.
    ///
    /// On success both icon variants are registered. Any failure (download
    /// or registration) switches the view to fallback pins for good.
    pub fn finish_icon_load(
        &mut self,
        canvas: &mut dyn MapCanvas,
        image: Result<Vec<u8>, String>,
    ) -> IconState {
        let registered = image
            .map_err(|reason| DashboardError::Canvas {
                operation: "icon download",
                reason,
            })
            .and_then(|bytes| {
                canvas.add_icon(ICON_NAME, &bytes)?;
                canvas.add_icon(ICON_SELECTED_NAME, &bytes)
            });

        self.icon = match registered {
            Ok(()) => IconState::Ready,
            Err(e) => {
                tracing::warn!(error = %e, "marker icon unavailable, using fallback pins");
                IconState::Failed
            }
        };
        self.icon
    }

    /// Brings the canvas in line with the POI list and selection.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Canvas`] if the canvas rejects a source,
    /// layer or marker update.
    pub fn sync(
        &mut self,
        canvas: &mut dyn MapCanvas,
        pois: &[Poi],
        selection: &SelectionState,
    ) -> Result<SyncOutcome, DashboardError> {
        if !canvas.is_style_loaded() || self.icon == IconState::Loading {
            tracing::debug!(icon = ?self.icon, "map not ready, sync deferred");
            return Ok(SyncOutcome::Deferred);
        }

        let plan = MapPlan::compute(pois, selection);
        if plan.dropped > 0 {
            tracing::debug!(dropped = plan.dropped, "POIs with invalid coordinates left off the map");
        }

        match self.icon {
            IconState::Ready => self.render_layers(canvas, &plan.features)?,
            IconState::Failed => canvas.set_fallback_markers(&plan.fallback_markers())?,
            IconState::Loading => {}
        }

        if let Some(command) = &plan.command {
            canvas.animate(command);
        }

        Ok(SyncOutcome::Rendered {
            mode: plan.mode,
            visible: plan.features.len(),
            command: plan.command,
        })
    }

    fn render_layers(
        &mut self,
        canvas: &mut dyn MapCanvas,
        features: &FeatureCollection,
    ) -> Result<(), DashboardError> {
        if self.source_added {
            canvas.set_source_data(POI_SOURCE_ID, features)?;
        } else {
            canvas.add_source(POI_SOURCE_ID, features)?;
            self.source_added = true;
        }

        for layer in &SYMBOL_LAYERS {
            if self.registered_layers.contains(&layer.id) {
                continue;
            }
            canvas.add_layer(layer)?;
            self.registered_layers.push(layer.id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{poi, CanvasCall, RecordingCanvas};

    fn ready_view(canvas: &mut RecordingCanvas) -> MapView {
        let mut view = MapView::new();
        assert_eq!(view.finish_icon_load(canvas, Ok(vec![1, 2, 3])), IconState::Ready);
        canvas.calls.clear();
        view
    }

    #[test]
    fn sync_is_deferred_until_style_loads() {
        let mut canvas = RecordingCanvas::loading();
        let mut view = MapView::new();
        view.finish_icon_load(&mut canvas, Ok(vec![0]));
        canvas.calls.clear();

        let outcome = view
            .sync(&mut canvas, &[poi("1", 23.8, 90.4)], &SelectionState::new())
            .expect("sync");
        assert_eq!(outcome, SyncOutcome::Deferred);
        assert!(canvas.calls.is_empty());
        assert!(!view.layers_initialized());
    }

    #[test]
    fn sync_is_deferred_while_icon_loads() {
        let mut canvas = RecordingCanvas::ready();
        let mut view = MapView::new();
        let outcome = view
            .sync(&mut canvas, &[poi("1", 23.8, 90.4)], &SelectionState::new())
            .expect("sync");
        assert_eq!(outcome, SyncOutcome::Deferred);
        assert!(canvas.calls.is_empty());
    }

    #[test]
    fn layers_are_registered_once() {
        let mut canvas = RecordingCanvas::ready();
        let mut view = ready_view(&mut canvas);
        let pois = vec![poi("1", 23.8, 90.4), poi("2", 23.9, 90.5)];
        let selection = SelectionState::new();

        view.sync(&mut canvas, &pois, &selection).expect("first sync");
        view.sync(&mut canvas, &pois, &selection).expect("second sync");

        assert_eq!(canvas.count(|c| matches!(c, CanvasCall::AddSource(_))), 1);
        assert_eq!(canvas.count(|c| matches!(c, CanvasCall::AddLayer(_))), 2);
        assert_eq!(canvas.count(|c| matches!(c, CanvasCall::SetSourceData(_))), 1);
        assert!(view.layers_initialized());
    }

    #[test]
    fn failed_layer_is_retried_on_next_sync() {
        let mut canvas = RecordingCanvas::ready();
        let mut view = ready_view(&mut canvas);
        canvas.fail_layer_once = Some("poi-icons");
        let pois = vec![poi("1", 23.8, 90.4)];
        let selection = SelectionState::new();

        assert!(view.sync(&mut canvas, &pois, &selection).is_err());
        assert!(!view.layers_initialized());

        view.sync(&mut canvas, &pois, &selection).expect("retry");
        assert!(view.layers_initialized());
        assert_eq!(canvas.count(|c| matches!(c, CanvasCall::AddSource(_))), 1);
        assert_eq!(canvas.count(|c| matches!(c, CanvasCall::SetSourceData(_))), 1);
        assert_eq!(
            canvas.count(|c| matches!(c, CanvasCall::AddLayer("poi-icons"))),
            1
        );
        assert_eq!(
            canvas.count(|c| matches!(c, CanvasCall::AddLayer("poi-icons-selected"))),
            1
        );

        view.sync(&mut canvas, &pois, &selection).expect("steady state");
        assert_eq!(canvas.count(|c| matches!(c, CanvasCall::AddLayer(_))), 2);
    }

    #[test]
    fn overview_fits_all_valid_pois() {
        let mut canvas = RecordingCanvas::ready();
        let mut view = ready_view(&mut canvas);
        let pois = vec![
            poi("1", 23.8, 90.4),
            poi("2", 23.9, 90.5),
            poi("bad", f64::NAN, 90.0),
            poi("far", 95.0, 90.0),
        ];

        let outcome = view
            .sync(&mut canvas, &pois, &SelectionState::new())
            .expect("sync");
        let SyncOutcome::Rendered {
            mode,
            visible,
            command,
        } = outcome
        else {
            panic!("expected render");
        };
        assert_eq!(mode, MapMode::Overview);
        assert_eq!(visible, 2);
        match command {
            Some(ViewportCommand::FitBounds { bounds, .. }) => {
                assert!(bounds.contains(LngLat { lng: 90.4, lat: 23.8 }));
                assert!(bounds.contains(LngLat { lng: 90.5, lat: 23.9 }));
            }
            other => panic!("expected fit-bounds, got {other:?}"),
        }
        assert_eq!(canvas.count(|c| matches!(c, CanvasCall::Animate(_))), 1);
    }

    #[test]
    fn focus_shows_only_selected_and_flies_to_it() {
        let mut canvas = RecordingCanvas::ready();
        let mut view = ready_view(&mut canvas);
        let pois = vec![poi("1", 23.8, 90.4), poi("2", 23.9, 90.5)];
        let mut selection = SelectionState::new();
        selection.toggle("2");

        let outcome = view.sync(&mut canvas, &pois, &selection).expect("sync");
        assert_eq!(
            outcome,
            SyncOutcome::Rendered {
                mode: MapMode::Focus("2".to_string()),
                visible: 1,
                command: Some(ViewportCommand::focus(LngLat { lng: 90.5, lat: 23.9 })),
            }
        );

        let source = canvas.last_source().expect("source data");
        assert_eq!(source.features.len(), 1);
        assert!(source.features[0].properties.is_selected);
    }

    #[test]
    fn empty_list_skips_animation() {
        let mut canvas = RecordingCanvas::ready();
        let mut view = ready_view(&mut canvas);
        let outcome = view
            .sync(&mut canvas, &[], &SelectionState::new())
            .expect("sync");
        assert!(matches!(
            outcome,
            SyncOutcome::Rendered {
                visible: 0,
                command: None,
                ..
            }
        ));
        assert_eq!(canvas.count(|c| matches!(c, CanvasCall::Animate(_))), 0);
    }

    #[test]
    fn icon_failure_falls_back_to_colored_pins() {
        let mut canvas = RecordingCanvas::ready();
        let mut view = MapView::new();
        assert_eq!(
            view.finish_icon_load(&mut canvas, Err("404".to_string())),
            IconState::Failed
        );

        let pois = vec![poi("1", 23.8, 90.4), poi("2", 23.9, 90.5), poi("3", 23.7, 90.3)];
        view.sync(&mut canvas, &pois, &SelectionState::new())
            .expect("sync");

        let markers = canvas.last_markers().expect("fallback markers");
        let colors: Vec<_> = markers.iter().map(|m| m.color).collect();
        assert_eq!(colors, vec!["#00A79D", "#FF0000", "#00A79D"]);
        assert_eq!(canvas.count(|c| matches!(c, CanvasCall::AddLayer(_))), 0);
        assert!(!view.layers_initialized());
    }

    #[test]
    fn rejected_icon_registration_counts_as_failure() {
        let mut canvas = RecordingCanvas::ready();
        canvas.reject_icons = true;
        let mut view = MapView::new();
        assert_eq!(view.finish_icon_load(&mut canvas, Ok(vec![1])), IconState::Failed);
    }

    #[test]
    fn popup_reflects_feature_properties() {
        let properties: FeatureProperties = serde_json::from_value(serde_json::json!({
            "id": "7",
            "name": "Cafe Roxy",
            "address": "12 Main St",
            "status": "valid",
            "index": 0,
            "isSelected": true
        }))
        .expect("properties");

        assert_eq!(
            popup_for(&properties),
            Popup {
                name: "Cafe Roxy".to_string(),
                address: "12 Main St".to_string(),
                status_label: "Approved".to_string(),
                is_selected: true,
            }
        );
    }

    #[test]
    fn features_serialize_as_geojson() {
        let plan = MapPlan::compute(&[poi("1", 23.8, 90.4)], &SelectionState::new());
        let json = serde_json::to_value(&plan.features).expect("serialize");
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["type"], "Feature");
        assert_eq!(json["features"][0]["geometry"]["coordinates"][0], 90.4);
        assert_eq!(json["features"][0]["properties"]["isSelected"], false);
    }
}
