use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum TempcastError {
    #[error("Malformed timestamp {0:?}, expected YYYY-MM-DD HH:MM")]
    MalformedTimestamp(String),
    #[error("Coordinates out of range: latitude={latitude}, longitude={longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("Historical record has {points} points but {values} values")]
    MisalignedRecord { points: usize, values: usize },
    #[error("Historical record is empty")]
    EmptyRecord,
    #[error("Record points must have 2 columns (longitude, latitude), got {0}")]
    InvalidPointShape(usize),
    #[error("Malformed dataset key {0:?}, expected YYYY-MM-DD HH:00:00")]
    MalformedDatasetKey(String),
    #[error("Triangulation needs at least 3 non-collinear points, got {0} points")]
    DegenerateTriangulation(usize),
    #[error("Invalid sample point ({x}, {y})")]
    InvalidSample { x: f64, y: f64 },
    #[error("Trend fit failed: {0}")]
    TrendFit(String),
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Convenience type for `Result<T, TempcastError>`.
pub type TempcastResult<T> = Result<T, TempcastError>;
