//! Test doubles shared by the unit tests in this crate.

use poidash_core::{Poi, PoiStatus};

use crate::map_view::{FallbackMarker, FeatureCollection, MapCanvas, Popup, SymbolLayer};
use crate::viewport::{LngLat, ViewportCommand};
use crate::DashboardError;

pub(crate) fn poi(id: &str, latitude: f64, longitude: f64) -> Poi {
    Poi {
        id: id.to_string(),
        name: format!("POI {id}"),
        address: format!("{id} Main St"),
        poi_type: String::new(),
        floor: String::new(),
        phone: String::new(),
        image: None,
        status: PoiStatus::Pending,
        latitude,
        longitude,
        created_at: None,
        updated_at: None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CanvasCall {
    AddIcon(String),
    AddSource(FeatureCollection),
    SetSourceData(FeatureCollection),
    AddLayer(&'static str),
    SetFallbackMarkers(Vec<FallbackMarker>),
    Animate(ViewportCommand),
    ShowPopup(LngLat, Popup),
}

/// Canvas that records every call instead of drawing.
#[derive(Debug, Default)]
pub(crate) struct RecordingCanvas {
    pub style_loaded: bool,
    pub reject_icons: bool,
    /// Layer id whose next `add_layer` call fails once.
    pub fail_layer_once: Option<&'static str>,
    pub calls: Vec<CanvasCall>,
}

impl RecordingCanvas {
    pub(crate) fn ready() -> Self {
        Self {
            style_loaded: true,
            ..Self::default()
        }
    }

    pub(crate) fn loading() -> Self {
        Self::default()
    }

    pub(crate) fn count(&self, pred: impl Fn(&CanvasCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub(crate) fn last_source(&self) -> Option<&FeatureCollection> {
        self.calls.iter().rev().find_map(|c| match c {
            CanvasCall::AddSource(data) | CanvasCall::SetSourceData(data) => Some(data),
            _ => None,
        })
    }

    pub(crate) fn last_markers(&self) -> Option<&[FallbackMarker]> {
        self.calls.iter().rev().find_map(|c| match c {
            CanvasCall::SetFallbackMarkers(markers) => Some(markers.as_slice()),
            _ => None,
        })
    }

    pub(crate) fn popups(&self) -> Vec<&Popup> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                CanvasCall::ShowPopup(_, popup) => Some(popup),
                _ => None,
            })
            .collect()
    }
}

impl MapCanvas for RecordingCanvas {
    fn is_style_loaded(&self) -> bool {
        self.style_loaded
    }

    fn add_icon(&mut self, name: &str, _image: &[u8]) -> Result<(), DashboardError> {
        if self.reject_icons {
            return Err(DashboardError::Canvas {
                operation: "add_icon",
                reason: "unsupported image".to_string(),
            });
        }
        self.calls.push(CanvasCall::AddIcon(name.to_string()));
        Ok(())
    }

    fn add_source(&mut self, _id: &str, data: &FeatureCollection) -> Result<(), DashboardError> {
        self.calls.push(CanvasCall::AddSource(data.clone()));
        Ok(())
    }

    fn set_source_data(
        &mut self,
        _id: &str,
        data: &FeatureCollection,
    ) -> Result<(), DashboardError> {
        self.calls.push(CanvasCall::SetSourceData(data.clone()));
        Ok(())
    }

    fn add_layer(&mut self, layer: &SymbolLayer) -> Result<(), DashboardError> {
        if self.fail_layer_once == Some(layer.id) {
            self.fail_layer_once = None;
            return Err(DashboardError::Canvas {
                operation: "add_layer",
                reason: "style rejected layer".to_string(),
            });
        }
        self.calls.push(CanvasCall::AddLayer(layer.id));
        Ok(())
    }

    fn set_fallback_markers(&mut self, markers: &[FallbackMarker]) -> Result<(), DashboardError> {
        self.calls
            .push(CanvasCall::SetFallbackMarkers(markers.to_vec()));
        Ok(())
    }

    fn animate(&mut self, command: &ViewportCommand) {
        self.calls.push(CanvasCall::Animate(command.clone()));
    }

    fn show_popup(&mut self, at: LngLat, popup: &Popup) {
        self.calls.push(CanvasCall::ShowPopup(at, popup.clone()));
    }
}
