use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SketchError;

/// Straight (non-premultiplied) color with components in `0.0..=1.0`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn with_alpha_scaled(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [
            to_channel(self.r),
            to_channel(self.g),
            to_channel(self.b),
            to_channel(self.a),
        ]
    }

    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {})", trim_alpha(self.a))
    }

    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn trim_alpha(alpha: f32) -> String {
    let text = format!("{:.3}", alpha.clamp(0.0, 1.0));
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl FromStr for Rgba {
    type Err = SketchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_hex_color(value)
    }
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(value: &str) -> Result<Rgba, SketchError> {
    let invalid = || SketchError::InvalidColorFormat(value.to_string());
    let digits = value.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |index: usize, width: usize| -> Result<u8, SketchError> {
        let text = &digits[index * width..(index + 1) * width];
        let parsed = u8::from_str_radix(text, 16).map_err(|_| invalid())?;
        Ok(if width == 1 { parsed * 17 } else { parsed })
    };
    match digits.len() {
        3 => Ok(Rgba::opaque(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?)),
        6 => Ok(Rgba::opaque(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
        8 => {
            let alpha = channel(3, 2)?;
            Ok(Rgba {
                a: alpha as f32 / 255.0,
                ..Rgba::opaque(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)
            })
        }
        _ => Err(invalid()),
    }
}
