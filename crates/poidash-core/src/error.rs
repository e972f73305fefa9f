use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("{field} is required")]
    MissingCoordinate { field: &'static str },

    #[error("invalid {field} '{value}': must be a number between {min} and {max}")]
    InvalidCoordinate {
        field: &'static str,
        value: String,
        min: f64,
        max: f64,
    },

    #[error("'{filename}' is not an image file")]
    NotAnImage { filename: String },

    #[error("'{filename}' is empty")]
    EmptyUpload { filename: String },
}
