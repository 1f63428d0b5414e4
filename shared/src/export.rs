use crate::error::SketchError;
use crate::raster::RasterSurface;

pub const DEFAULT_EXPORT_PREFIX: &str = "Drawing";

#[derive(Clone, Debug)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub const MIME_TYPE: &'static str = "image/png";
}

/// `<prefix>_<timestamp>.png`, with the prefix reduced to characters that
/// are safe in a file name.
pub fn export_file_name(prefix: &str, timestamp_ms: u64) -> String {
    let cleaned = prefix
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    let cleaned = cleaned.trim_matches('_');
    let prefix = if cleaned.is_empty() {
        DEFAULT_EXPORT_PREFIX
    } else {
        cleaned
    };
    format!("{prefix}_{timestamp_ms}.png")
}

pub fn export_surface(
    surface: &RasterSurface,
    prefix: &str,
    timestamp_ms: u64,
) -> Result<ExportArtifact, SketchError> {
    let bytes = surface.encode_png()?;
    Ok(ExportArtifact {
        file_name: export_file_name(prefix, timestamp_ms),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DrawingSession, SessionConfig};

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn file_name_carries_prefix_and_timestamp() {
        assert_eq!(export_file_name("Drawing", 1_700_000_000_123), "Drawing_1700000000123.png");
        assert_eq!(export_file_name("My Drawing/HG", 5), "My_Drawing_HG_5.png");
        assert_eq!(export_file_name("  ", 5), "Drawing_5.png");
    }

    #[test]
    fn untouched_surface_exports_a_blank_png() {
        let session = DrawingSession::with_raster(&SessionConfig::default()).unwrap();
        let artifact = session.export(DEFAULT_EXPORT_PREFIX, 42).unwrap();
        assert_eq!(artifact.file_name, "Drawing_42.png");
        assert!(artifact.bytes.starts_with(&PNG_SIGNATURE));

        let decoded = tiny_skia::Pixmap::decode_png(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (800, 500));
        assert!(decoded.pixels().iter().all(|pixel| pixel.alpha() == 0));
    }
}
