use crate::color::Rgba;
use crate::tool::{CompositeMode, LineCap, LineJoin, StrokePaint, ToolProfile};
use crate::Point;

/// Rendering configuration in effect for the next segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub composite: CompositeMode,
    pub cap: LineCap,
    pub join: LineJoin,
    pub paint: StrokePaint,
    pub width: f32,
}

impl StrokeStyle {
    pub fn from_profile(profile: &ToolProfile, base: Rgba, width: f32) -> Self {
        Self {
            composite: profile.composite,
            cap: profile.cap,
            join: profile.join,
            paint: profile.paint(base),
            width,
        }
    }
}

/// Immediate-mode drawing target. Segments use whatever style was last
/// passed to `configure`.
pub trait StrokeSurface {
    fn size(&self) -> (u32, u32);
    fn configure(&mut self, style: &StrokeStyle);
    fn stroke_segment(&mut self, from: Point, to: Point);
    fn clear(&mut self);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Configure(StrokeStyle),
        Segment(Point, Point),
        Clear,
    }

    pub struct RecordingSurface {
        pub width: u32,
        pub height: u32,
        pub calls: Vec<Call>,
    }

    impl RecordingSurface {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                calls: Vec::new(),
            }
        }

        pub fn segments(&self) -> Vec<(Point, Point, StrokeStyle)> {
            let mut style = None;
            let mut out = Vec::new();
            for call in &self.calls {
                match call {
                    Call::Configure(next) => style = Some(*next),
                    Call::Segment(from, to) => {
                        if let Some(style) = style {
                            out.push((*from, *to, style));
                        }
                    }
                    Call::Clear => {}
                }
            }
            out
        }
    }

    impl StrokeSurface for RecordingSurface {
        fn size(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn configure(&mut self, style: &StrokeStyle) {
            self.calls.push(Call::Configure(*style));
        }

        fn stroke_segment(&mut self, from: Point, to: Point) {
            self.calls.push(Call::Segment(from, to));
        }

        fn clear(&mut self) {
            self.calls.push(Call::Clear);
        }
    }
}
