use crate::color::{parse_hex_color, Rgba};
use crate::error::SketchError;
use crate::export::{export_surface, ExportArtifact};
use crate::geometry::{map_input_to_surface, DisplayRect, PointerInput};
use crate::raster::RasterSurface;
use crate::surface::{StrokeStyle, StrokeSurface};
use crate::tool::{ToolKind, ToolProfile};
use crate::Point;

pub const DEFAULT_SURFACE_WIDTH: u32 = 800;
pub const DEFAULT_SURFACE_HEIGHT: u32 = 500;
pub const DEFAULT_SIZE: f32 = 5.0;
pub const MIN_SIZE: f32 = 1.0;
pub const MAX_SIZE: f32 = 60.0;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub surface_width: u32,
    pub surface_height: u32,
    pub color: Rgba,
    pub size: f32,
    pub tool: ToolKind,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            surface_width: DEFAULT_SURFACE_WIDTH,
            surface_height: DEFAULT_SURFACE_HEIGHT,
            color: Rgba::opaque(0x76, 0x4b, 0xa2),
            size: DEFAULT_SIZE,
            tool: ToolKind::Pencil,
        }
    }
}

pub fn sanitize_size(size: f32) -> f32 {
    let size = if size.is_finite() { size } else { DEFAULT_SIZE };
    size.clamp(MIN_SIZE, MAX_SIZE)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerState {
    Idle,
    Drawing { last: Point },
}

impl PointerState {
    pub fn is_active(&self) -> bool {
        matches!(self, PointerState::Drawing { .. })
    }

    pub fn last_position(&self) -> Option<Point> {
        match self {
            PointerState::Drawing { last } => Some(*last),
            PointerState::Idle => None,
        }
    }
}

/// One drawing page: the surface, the selected tool and the pointer.
///
/// Every control change re-derives the stroke style from the active
/// profile and pushes it to the surface straight away, so the surface is
/// always configured for the next segment.
pub struct DrawingSession<S: StrokeSurface> {
    surface: S,
    profile: &'static ToolProfile,
    color: Rgba,
    size: f32,
    pointer: PointerState,
}

impl<S: StrokeSurface> DrawingSession<S> {
    pub fn new(surface: S, config: &SessionConfig) -> Self {
        let mut session = Self {
            surface,
            profile: config.tool.profile(),
            color: config.color,
            size: sanitize_size(config.size),
            pointer: PointerState::Idle,
        };
        session.apply_style();
        session
    }

    pub fn tool(&self) -> ToolKind {
        self.profile.kind
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn style(&self) -> StrokeStyle {
        StrokeStyle::from_profile(self.profile, self.color, self.size)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn select_tool(&mut self, kind: ToolKind) {
        self.profile = kind.profile();
        self.apply_style();
    }

    /// Sets the base color from a hex control value. The active tool's
    /// transform is applied on top, so a marker stays translucent.
    pub fn set_color(&mut self, value: &str) -> Result<(), SketchError> {
        let color = parse_hex_color(value)?;
        self.set_base_color(color);
        Ok(())
    }

    pub fn set_base_color(&mut self, color: Rgba) {
        self.color = color;
        self.apply_style();
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = sanitize_size(size);
        self.apply_style();
    }

    /// Wipes the surface and falls back to the pencil.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.select_tool(ToolKind::Pencil);
    }

    /// Starts a stroke. Returns `false` when the input was ignored.
    pub fn pointer_down(&mut self, input: PointerInput<'_>, rect: DisplayRect) -> bool {
        let Some(point) = self.map_input(input, rect) else {
            return false;
        };
        self.pointer = PointerState::Drawing { last: point };
        true
    }

    /// Commits one segment from the previous point. Returns `true` when a
    /// segment was drawn.
    pub fn pointer_move(&mut self, input: PointerInput<'_>, rect: DisplayRect) -> bool {
        let PointerState::Drawing { last } = self.pointer else {
            return false;
        };
        let Some(point) = self.map_input(input, rect) else {
            return false;
        };
        self.surface.stroke_segment(last, point);
        self.pointer = PointerState::Drawing { last: point };
        true
    }

    /// Pointer up, pointer leaving the surface, touch end and touch cancel
    /// all land here.
    pub fn pointer_up(&mut self) {
        self.pointer = PointerState::Idle;
    }

    fn map_input(&self, input: PointerInput<'_>, rect: DisplayRect) -> Option<Point> {
        let (x, y) = input.primary_position()?;
        let (width, height) = self.surface.size();
        map_input_to_surface(x, y, rect, width, height)
    }

    fn apply_style(&mut self) {
        let style = self.style();
        self.surface.configure(&style);
    }
}

impl DrawingSession<RasterSurface> {
    pub fn with_raster(config: &SessionConfig) -> Result<Self, SketchError> {
        let surface = RasterSurface::new(config.surface_width, config.surface_height)?;
        Ok(Self::new(surface, config))
    }

    pub fn export(&self, prefix: &str, timestamp_ms: u64) -> Result<ExportArtifact, SketchError> {
        export_surface(&self.surface, prefix, timestamp_ms)
    }
}
