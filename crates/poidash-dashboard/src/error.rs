use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("unknown POI id '{id}'")]
    UnknownPoi { id: String },

    #[error("map feature properties are invalid: {0}")]
    InvalidFeature(#[source] serde_json::Error),

    #[error("map canvas rejected {operation}: {reason}")]
    Canvas {
        operation: &'static str,
        reason: String,
    },
}
