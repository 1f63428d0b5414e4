#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SketchError {
    #[error("invalid color format: {0:?}")]
    InvalidColorFormat(String),
    #[error("export encoding failed: {0}")]
    ExportEncodingFailed(String),
    #[error("notification delivery failed: {0}")]
    NotificationDeliveryFailed(String),
    #[error("cannot allocate a {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },
}
