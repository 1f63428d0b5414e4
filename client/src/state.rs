use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use sketchpad_shared::{DrawingSession, RasterSurface};

pub const EXPORT_PREFIX: &str = "Drawing";

pub struct State {
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub session: DrawingSession<RasterSurface>,
}
