use poidash_core::Poi;
use serde::Serialize;

/// Read-only view of one POI for the detail dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiDetail {
    pub id: String,
    pub name: String,
    pub address: String,
    pub poi_type: String,
    pub floor: String,
    pub phone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub coordinates: String,
    pub status_label: &'static str,
    pub image: Option<String>,
}

impl From<&Poi> for PoiDetail {
    fn from(poi: &Poi) -> Self {
        Self {
            id: poi.id.clone(),
            name: poi.name.clone(),
            address: poi.address.clone(),
            poi_type: poi.poi_type.clone(),
            floor: poi.floor.clone(),
            phone: poi.phone.clone(),
            latitude: poi.latitude,
            longitude: poi.longitude,
            coordinates: poi.coordinates_label(),
            status_label: poi.status.label(),
            image: poi.image.clone(),
        }
    }
}
