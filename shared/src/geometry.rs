use crate::Point;

/// On-screen box of the canvas element, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.left.is_finite() && self.top.is_finite()
    }
}

/// Raw input from either a mouse/pen pointer or a touch screen.
#[derive(Clone, Copy, Debug)]
pub enum PointerInput<'a> {
    Pointer { x: f64, y: f64 },
    Touch(&'a [(f64, f64)]),
}

impl PointerInput<'_> {
    /// The single contact point, or `None` for multi-touch and empty touch lists.
    pub fn primary_position(&self) -> Option<(f64, f64)> {
        match self {
            PointerInput::Pointer { x, y } => Some((*x, *y)),
            PointerInput::Touch([only]) => Some(*only),
            PointerInput::Touch(_) => None,
        }
    }
}

pub fn normalize_point(point: Point) -> Option<Point> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return None;
    }
    Some(point)
}

pub fn map_input_to_surface(
    raw_x: f64,
    raw_y: f64,
    rect: DisplayRect,
    surface_width: u32,
    surface_height: u32,
) -> Option<Point> {
    if !rect.is_usable() {
        return None;
    }
    let scale_x = surface_width as f64 / rect.width;
    let scale_y = surface_height as f64 / rect.height;
    normalize_point(Point {
        x: ((raw_x - rect.left) * scale_x) as f32,
        y: ((raw_y - rect.top) * scale_y) as f32,
    })
}

pub fn surface_to_display(
    point: Point,
    rect: DisplayRect,
    surface_width: u32,
    surface_height: u32,
) -> Option<(f64, f64)> {
    if !rect.is_usable() || surface_width == 0 || surface_height == 0 {
        return None;
    }
    let x = point.x as f64 * rect.width / surface_width as f64 + rect.left;
    let y = point.y as f64 * rect.height / surface_height as f64 + rect.top;
    Some((x, y))
}
