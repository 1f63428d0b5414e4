use serde::{Deserialize, Serialize};

pub mod color;
pub mod error;
pub mod export;
pub mod geometry;
pub mod raster;
pub mod session;
pub mod signal;
pub mod surface;
pub mod tool;

pub use color::{parse_hex_color, Rgba};
pub use error::SketchError;
pub use export::{export_file_name, ExportArtifact, DEFAULT_EXPORT_PREFIX};
pub use geometry::{map_input_to_surface, surface_to_display, DisplayRect, PointerInput};
pub use raster::RasterSurface;
pub use session::{DrawingSession, PointerState, SessionConfig};
pub use signal::{
    SignalClientMessage, SignalEvent, SignalFeed, SignalServerMessage, SIGNAL_FRESHNESS_MS,
};
pub use surface::{StrokeStyle, StrokeSurface};
pub use tool::{
    ColorTransform, CompositeMode, LineCap, LineJoin, StrokePaint, ToolKind, ToolProfile,
};

/// Position in surface space (logical raster pixels).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}
