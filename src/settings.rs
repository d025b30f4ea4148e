use crate::error::EditorError;
use crate::ops::transform::Interpolation;

/// Editor settings supplied by the host.
///
/// The text form is one `key=value` pair per line; unknown keys are ignored so
/// hosts can keep their own entries in the same file.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorSettings {
    /// Fixed surface width for the whole session.
    pub viewport_width: u32,
    /// Fixed surface height for the whole session.
    pub viewport_height: u32,
    /// Per-channel tolerance for background removal (strictly-less-than).
    pub chroma_threshold: u8,
    /// Maximum number of undo steps. At least one step is always kept.
    pub max_undo_steps: usize,
    /// History memory cap in MiB (0 = unlimited)
    pub max_history_mb: usize,
    /// Resampling filter for upload placement and resize.
    pub interpolation: Interpolation,
    /// Default text overlay size in pixels.
    pub text_size: f32,
    /// Default text overlay color (RGBA).
    pub text_color: [u8; 4],
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            viewport_width: 800,
            viewport_height: 600,
            chroma_threshold: 30,
            max_undo_steps: 50,
            max_history_mb: 100,
            interpolation: Interpolation::Bilinear,
            text_size: 32.0,
            text_color: [0, 0, 0, 255],
        }
    }
}

impl EditorSettings {
    /// History memory cap in bytes, `None` when unlimited.
    pub fn max_history_bytes(&self) -> Option<usize> {
        if self.max_history_mb == 0 {
            None
        } else {
            Some(self.max_history_mb * 1024 * 1024)
        }
    }

    /// Serialize a color as "r,g,b,a"
    fn color_to_str(c: [u8; 4]) -> String {
        format!("{},{},{},{}", c[0], c[1], c[2], c[3])
    }

    /// Parse a color from "r,g,b,a"
    fn str_to_color(s: &str) -> Option<[u8; 4]> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() == 4 {
            let r = parts[0].trim().parse::<u8>().ok()?;
            let g = parts[1].trim().parse::<u8>().ok()?;
            let b = parts[2].trim().parse::<u8>().ok()?;
            let a = parts[3].trim().parse::<u8>().ok()?;
            Some([r, g, b, a])
        } else {
            None
        }
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "viewport_width={}\n\
             viewport_height={}\n\
             chroma_threshold={}\n\
             max_undo_steps={}\n\
             max_history_mb={}\n\
             interpolation={}\n\
             text_size={}\n\
             text_color={}\n",
            self.viewport_width,
            self.viewport_height,
            self.chroma_threshold,
            self.max_undo_steps,
            self.max_history_mb,
            self.interpolation.key(),
            self.text_size,
            Self::color_to_str(self.text_color),
        )
    }

    /// Parse settings text on top of the defaults.
    pub fn parse(content: &str) -> Result<Self, EditorError> {
        let mut settings = Self::default();
        for (line_no, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(EditorError::Settings(format!(
                    "line {}: expected key=value, got {:?}",
                    line_no + 1,
                    line
                )));
            };
            let (key, value) = (key.trim(), value.trim());
            let bad = || EditorError::Settings(format!("line {}: invalid {} {:?}", line_no + 1, key, value));
            match key {
                "viewport_width" => settings.viewport_width = parse_nonzero(value).ok_or_else(bad)?,
                "viewport_height" => settings.viewport_height = parse_nonzero(value).ok_or_else(bad)?,
                "chroma_threshold" => settings.chroma_threshold = value.parse().map_err(|_| bad())?,
                "max_undo_steps" => {
                    settings.max_undo_steps = value.parse::<usize>().ok().filter(|v| *v > 0).ok_or_else(bad)?
                }
                "max_history_mb" => settings.max_history_mb = value.parse().map_err(|_| bad())?,
                "interpolation" => settings.interpolation = Interpolation::from_key(value).ok_or_else(bad)?,
                "text_size" => {
                    let size: f32 = value.parse().map_err(|_| bad())?;
                    if !(size.is_finite() && size > 0.0) {
                        return Err(bad());
                    }
                    settings.text_size = size;
                }
                "text_color" => settings.text_color = Self::str_to_color(value).ok_or_else(bad)?,
                _ => {}
            }
        }
        Ok(settings)
    }
}

fn parse_nonzero(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_stock_canvas() {
        let s = EditorSettings::default();
        assert_eq!((s.viewport_width, s.viewport_height), (800, 600));
        assert_eq!(s.chroma_threshold, 30);
        assert_eq!(s.max_history_bytes(), Some(100 * 1024 * 1024));
    }

    #[test]
    fn config_text_round_trips() {
        let s = EditorSettings {
            viewport_width: 1024,
            viewport_height: 768,
            chroma_threshold: 12,
            max_undo_steps: 7,
            max_history_mb: 0,
            interpolation: Interpolation::Lanczos3,
            text_size: 18.5,
            text_color: [10, 20, 30, 40],
        };
        let parsed = EditorSettings::parse(&s.to_config_string()).unwrap();
        assert_eq!(parsed, s);
        assert_eq!(parsed.max_history_bytes(), None);
    }

    #[test]
    fn comments_and_unknown_keys_are_skipped() {
        let parsed = EditorSettings::parse("# host prefs\n\ntheme_mode=dark\nviewport_width=640\n").unwrap();
        assert_eq!(parsed.viewport_width, 640);
        assert_eq!(parsed.viewport_height, 600);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(EditorSettings::parse("viewport_width=0"), Err(EditorError::Settings(_))));
        assert!(matches!(EditorSettings::parse("max_undo_steps=0"), Err(EditorError::Settings(_))));
        assert!(matches!(EditorSettings::parse("text_color=1,2,3"), Err(EditorError::Settings(_))));
        assert!(matches!(EditorSettings::parse("interpolation=cubic"), Err(EditorError::Settings(_))));
        assert!(matches!(EditorSettings::parse("just a line"), Err(EditorError::Settings(_))));
    }
}
