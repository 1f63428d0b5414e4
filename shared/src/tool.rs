use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgba;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pencil,
    Pen,
    Marker,
    Crayon,
    Eraser,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Pencil,
        ToolKind::Pen,
        ToolKind::Marker,
        ToolKind::Crayon,
        ToolKind::Eraser,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pencil => "pencil",
            ToolKind::Pen => "pen",
            ToolKind::Marker => "marker",
            ToolKind::Crayon => "crayon",
            ToolKind::Eraser => "eraser",
        }
    }

    pub fn profile(self) -> &'static ToolProfile {
        ToolProfile::lookup(self)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTool(pub String);

impl fmt::Display for UnknownTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tool: {}", self.0)
    }
}

impl std::error::Error for UnknownTool {}

impl FromStr for ToolKind {
    type Err = UnknownTool;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownTool(value.to_string()))
    }
}

/// How a new stroke combines with what is already on the surface.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompositeMode {
    Normal,
    Multiply,
    Erase,
}

impl CompositeMode {
    /// The equivalent `globalCompositeOperation` value.
    pub fn css_operation(self) -> &'static str {
        match self {
            CompositeMode::Normal => "source-over",
            CompositeMode::Multiply => "multiply",
            CompositeMode::Erase => "destination-out",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Round,
    Square,
    Butt,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Round,
    Bevel,
    Miter,
}

/// What a stroke deposits on the surface.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum StrokePaint {
    Color(Rgba),
    /// Discards destination pixels under the stroke.
    Erase,
}

impl StrokePaint {
    pub fn color(self) -> Option<Rgba> {
        match self {
            StrokePaint::Color(color) => Some(color),
            StrokePaint::Erase => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorTransform {
    Solid,
    Opacity(f32),
    Erase,
}

impl ColorTransform {
    pub fn apply(self, base: Rgba) -> StrokePaint {
        match self {
            ColorTransform::Solid => StrokePaint::Color(base),
            ColorTransform::Opacity(factor) => StrokePaint::Color(base.with_alpha_scaled(factor)),
            ColorTransform::Erase => StrokePaint::Erase,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolProfile {
    pub kind: ToolKind,
    pub composite: CompositeMode,
    pub cap: LineCap,
    pub join: LineJoin,
    pub transform: ColorTransform,
}

pub const MARKER_OPACITY: f32 = 0.3;
pub const CRAYON_OPACITY: f32 = 0.85;

static PROFILES: [ToolProfile; 5] = [
    ToolProfile {
        kind: ToolKind::Pencil,
        composite: CompositeMode::Normal,
        cap: LineCap::Round,
        join: LineJoin::Round,
        transform: ColorTransform::Solid,
    },
    ToolProfile {
        kind: ToolKind::Pen,
        composite: CompositeMode::Normal,
        cap: LineCap::Butt,
        join: LineJoin::Miter,
        transform: ColorTransform::Solid,
    },
    ToolProfile {
        kind: ToolKind::Marker,
        composite: CompositeMode::Normal,
        cap: LineCap::Round,
        join: LineJoin::Round,
        transform: ColorTransform::Opacity(MARKER_OPACITY),
    },
    ToolProfile {
        kind: ToolKind::Crayon,
        composite: CompositeMode::Multiply,
        cap: LineCap::Square,
        join: LineJoin::Bevel,
        transform: ColorTransform::Opacity(CRAYON_OPACITY),
    },
    ToolProfile {
        kind: ToolKind::Eraser,
        composite: CompositeMode::Erase,
        cap: LineCap::Round,
        join: LineJoin::Round,
        transform: ColorTransform::Erase,
    },
];

impl ToolProfile {
    pub fn lookup(kind: ToolKind) -> &'static ToolProfile {
        match kind {
            ToolKind::Pencil => &PROFILES[0],
            ToolKind::Pen => &PROFILES[1],
            ToolKind::Marker => &PROFILES[2],
            ToolKind::Crayon => &PROFILES[3],
            ToolKind::Eraser => &PROFILES[4],
        }
    }

    pub fn paint(&self, base: Rgba) -> StrokePaint {
        self.transform.apply(base)
    }
}
