//! Viewport math and the animation commands sent to the map canvas.

use poidash_core::Poi;
use serde::Serialize;

/// Zoom used when flying to a single selected POI.
pub const FOCUS_ZOOM: f64 = 16.0;
pub const FOCUS_DURATION_MS: u32 = 1500;

/// Margin (px) kept around the fitted bounding box.
pub const FIT_PADDING_PX: u32 = 100;
/// Caps fit-bounds so single or coincident points do not over-zoom.
pub const FIT_MAX_ZOOM: f64 = 15.0;
pub const FIT_DURATION_MS: u32 = 1000;

/// A map position in GeoJSON axis order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    #[must_use]
    pub fn of(poi: &Poi) -> Self {
        Self {
            lng: poi.longitude,
            lat: poi.latitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn contains(&self, point: LngLat) -> bool {
        (self.west..=self.east).contains(&point.lng)
            && (self.south..=self.north).contains(&point.lat)
    }
}

/// Smallest box enclosing every point, or `None` for an empty input.
///
/// Non-finite points are skipped so a stray NaN cannot poison the result.
pub fn bounding_box(points: impl IntoIterator<Item = LngLat>) -> Option<BoundingBox> {
    points
        .into_iter()
        .filter(|p| p.lng.is_finite() && p.lat.is_finite())
        .fold(None, |acc: Option<BoundingBox>, p| {
            Some(match acc {
                None => BoundingBox {
                    west: p.lng,
                    south: p.lat,
                    east: p.lng,
                    north: p.lat,
                },
                Some(b) => BoundingBox {
                    west: b.west.min(p.lng),
                    south: b.south.min(p.lat),
                    east: b.east.max(p.lng),
                    north: b.north.max(p.lat),
                },
            })
        })
}

/// A fire-and-forget viewport animation. A newer command supersedes any
/// animation still running on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewportCommand {
    FlyTo {
        center: LngLat,
        zoom: f64,
        duration_ms: u32,
        essential: bool,
    },
    FitBounds {
        bounds: BoundingBox,
        padding_px: u32,
        max_zoom: f64,
        duration_ms: u32,
        linear: bool,
    },
}

impl ViewportCommand {
    #[must_use]
    pub fn focus(center: LngLat) -> Self {
        ViewportCommand::FlyTo {
            center,
            zoom: FOCUS_ZOOM,
            duration_ms: FOCUS_DURATION_MS,
            essential: true,
        }
    }

    #[must_use]
    pub fn overview(bounds: BoundingBox) -> Self {
        ViewportCommand::FitBounds {
            bounds,
            padding_px: FIT_PADDING_PX,
            max_zoom: FIT_MAX_ZOOM,
            duration_ms: FIT_DURATION_MS,
            linear: true,
        }
    }
}

impl std::fmt::Display for ViewportCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewportCommand::FlyTo {
                center,
                zoom,
                duration_ms,
                ..
            } => write!(
                f,
                "fly to ({}, {}) at zoom {zoom} over {duration_ms} ms",
                center.lat, center.lng
            ),
            ViewportCommand::FitBounds {
                bounds,
                padding_px,
                max_zoom,
                ..
            } => write!(
                f,
                "fit bounds [{}, {}, {}, {}] padding {padding_px}px max zoom {max_zoom}",
                bounds.west, bounds.south, bounds.east, bounds.north
            ),
        }
    }
}
