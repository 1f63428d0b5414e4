use tiny_skia::{BlendMode, Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::color::Rgba;
use crate::error::SketchError;
use crate::surface::{StrokeStyle, StrokeSurface};
use crate::tool::{CompositeMode, LineCap, LineJoin, StrokePaint, ToolKind};
use crate::Point;

/// Fixed-resolution RGBA buffer. Strokes are committed immediately; there is
/// no history.
pub struct RasterSurface {
    pixmap: Pixmap,
    style: StrokeStyle,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, SketchError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(SketchError::SurfaceAllocation { width, height })?;
        Ok(Self {
            pixmap,
            style: StrokeStyle::from_profile(ToolKind::Pencil.profile(), Rgba::BLACK, 1.0),
        })
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    /// Row-major straight-alpha RGBA, the layout `ImageData` expects.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let color = pixel.demultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect()
    }

    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|pixel| pixel.alpha() == 0)
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, SketchError> {
        self.pixmap
            .encode_png()
            .map_err(|error| SketchError::ExportEncodingFailed(error.to_string()))
    }

    fn paint(&self) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.anti_alias = true;
        match self.style.paint {
            StrokePaint::Color(color) => {
                let [r, g, b, a] = color.to_rgba8();
                paint.set_color(Color::from_rgba8(r, g, b, a));
                paint.blend_mode = match self.style.composite {
                    CompositeMode::Normal => BlendMode::SourceOver,
                    CompositeMode::Multiply => BlendMode::Multiply,
                    CompositeMode::Erase => BlendMode::DestinationOut,
                };
            }
            StrokePaint::Erase => {
                paint.set_color(Color::BLACK);
                paint.blend_mode = BlendMode::DestinationOut;
            }
        }
        paint
    }

    fn stroke(&self) -> Stroke {
        Stroke {
            width: self.style.width,
            line_cap: match self.style.cap {
                LineCap::Round => tiny_skia::LineCap::Round,
                LineCap::Square => tiny_skia::LineCap::Square,
                LineCap::Butt => tiny_skia::LineCap::Butt,
            },
            line_join: match self.style.join {
                LineJoin::Round => tiny_skia::LineJoin::Round,
                LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
                LineJoin::Miter => tiny_skia::LineJoin::Miter,
            },
            ..Stroke::default()
        }
    }

    fn draw_dot(&mut self, at: Point) {
        let paint = self.paint();
        let half = self.style.width / 2.0;
        match self.style.cap {
            LineCap::Round => {
                if let Some(path) = PathBuilder::from_circle(at.x, at.y, half) {
                    self.pixmap.fill_path(
                        &path,
                        &paint,
                        FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
            }
            LineCap::Square => {
                if let Some(rect) =
                    Rect::from_xywh(at.x - half, at.y - half, self.style.width, self.style.width)
                {
                    self.pixmap
                        .fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
            // A zero-length butt-capped line covers no area.
            LineCap::Butt => {}
        }
    }
}

impl StrokeSurface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn configure(&mut self, style: &StrokeStyle) {
        self.style = *style;
    }

    fn stroke_segment(&mut self, from: Point, to: Point) {
        if from == to {
            self.draw_dot(to);
            return;
        }
        let mut builder = PathBuilder::new();
        builder.move_to(from.x, from.y);
        builder.line_to(to.x, to.y);
        let Some(path) = builder.finish() else {
            return;
        };
        let paint = self.paint();
        let stroke = self.stroke();
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::parse_hex_color;

    fn style_for(kind: ToolKind, color: &str, width: f32) -> StrokeStyle {
        StrokeStyle::from_profile(kind.profile(), parse_hex_color(color).unwrap(), width)
    }

    fn fill_band(surface: &mut RasterSurface) {
        surface.configure(&style_for(ToolKind::Pencil, "#000000", 20.0));
        surface.stroke_segment(Point { x: 10.0, y: 50.0 }, Point { x: 90.0, y: 50.0 });
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        assert!(matches!(
            RasterSurface::new(0, 10),
            Err(SketchError::SurfaceAllocation { width: 0, height: 10 })
        ));
    }

    #[test]
    fn pencil_paints_opaque_pixels() {
        let mut surface = RasterSurface::new(100, 100).unwrap();
        fill_band(&mut surface);
        assert_eq!(surface.pixel(50, 50), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(50, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn eraser_leaves_transparent_pixels_not_white() {
        let mut surface = RasterSurface::new(100, 100).unwrap();
        fill_band(&mut surface);
        surface.configure(&style_for(ToolKind::Eraser, "#ffffff", 30.0));
        surface.stroke_segment(Point { x: 5.0, y: 50.0 }, Point { x: 95.0, y: 50.0 });
        let pixel = surface.pixel(50, 50).unwrap();
        assert_eq!(pixel[3], 0);
        assert_ne!(pixel, [255, 255, 255, 255]);
        assert!(surface.is_blank());
    }

    #[test]
    fn marker_deposits_partial_alpha() {
        let mut surface = RasterSurface::new(100, 100).unwrap();
        surface.configure(&style_for(ToolKind::Marker, "#764ba2", 10.0));
        surface.stroke_segment(Point { x: 10.0, y: 10.0 }, Point { x: 50.0, y: 50.0 });
        let [r, g, b, a] = surface.pixel(30, 30).unwrap();
        assert!((75..=78).contains(&a), "alpha {a}");
        assert!(r.abs_diff(0x76) <= 3 && g.abs_diff(0x4b) <= 3 && b.abs_diff(0xa2) <= 3);
    }

    #[test]
    fn crayon_multiplies_into_existing_pixels() {
        let mut surface = RasterSurface::new(100, 100).unwrap();
        surface.configure(&style_for(ToolKind::Pencil, "#c0c0c0", 20.0));
        surface.stroke_segment(Point { x: 10.0, y: 50.0 }, Point { x: 90.0, y: 50.0 });
        let fill = [0xc0u8, 0xc0, 0xc0];
        let crayon = [0x80u8, 0xa0, 0xe0];

        surface.configure(&style_for(ToolKind::Crayon, "#80a0e0", 10.0));
        surface.stroke_segment(Point { x: 20.0, y: 50.0 }, Point { x: 80.0, y: 50.0 });

        let [r, g, b, a] = surface.pixel(50, 50).unwrap();
        assert_eq!(a, 255);
        for (channel, (under, over)) in [r, g, b].into_iter().zip(fill.into_iter().zip(crayon)) {
            assert!(channel < under.min(over), "{channel} vs fill {under} crayon {over}");
        }
    }

    #[test]
    fn degenerate_segment_draws_a_cap_shaped_dot() {
        let mut surface = RasterSurface::new(40, 40).unwrap();
        surface.configure(&style_for(ToolKind::Pencil, "#ff0000", 8.0));
        let at = Point { x: 20.0, y: 20.0 };
        surface.stroke_segment(at, at);
        assert_eq!(surface.pixel(20, 20), Some([255, 0, 0, 255]));

        let mut butt = RasterSurface::new(40, 40).unwrap();
        butt.configure(&style_for(ToolKind::Pen, "#ff0000", 8.0));
        butt.stroke_segment(at, at);
        assert!(butt.is_blank());
    }

    #[test]
    fn clear_resets_to_transparent() {
        let mut surface = RasterSurface::new(100, 100).unwrap();
        fill_band(&mut surface);
        assert!(!surface.is_blank());
        surface.clear();
        assert!(surface.is_blank());
    }

    #[test]
    fn rgba_bytes_cover_every_pixel() {
        let surface = RasterSurface::new(7, 3).unwrap();
        assert_eq!(surface.to_rgba_bytes().len(), 7 * 3 * 4);
    }
}
