use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::config::RenderConfig;
use crate::error::{Result, WortlautError};

/// One caption shown on screen for the duration of its audio clip
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionEvent {
    /// Start time in seconds from track start
    pub start: f64,
    /// End time in seconds from track start
    pub end: f64,
    pub text: String,
}

/// Generate an ASS subtitle file from caption events. Each event fades
/// in and out over the configured fade duration.
pub async fn generate_ass<P: AsRef<Path>>(
    events: &[CaptionEvent],
    style: &RenderConfig,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(
        "Generating ASS caption file with {} events: {}",
        events.len(),
        output_path.display()
    );

    let mut content = String::new();
    content.push_str("[Script Info]\n");
    content.push_str("ScriptType: v4.00+\n");
    content.push_str(&format!("PlayResX: {}\n", style.width));
    content.push_str(&format!("PlayResY: {}\n\n", style.height));

    content.push_str("[V4+ Styles]\n");
    content.push_str(
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, \
         BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
         BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n",
    );
    // Alignment 5 centers the caption on screen
    content.push_str(&format!(
        "Style: Default,{},{},{},&H00FFFFFF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,0,0,5,60,60,60,1\n\n",
        style.font,
        style.font_size,
        ass_color(&style.text_color)?,
    ));

    content.push_str("[Events]\n");
    content.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");

    for event in events {
        let text = event.text.replace('\n', "\\N");
        content.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{{\\fad({},{})}}{}\n",
            format_ass_time(event.start),
            format_ass_time(event.end),
            style.fade_ms,
            style.fade_ms,
            text
        ));
    }

    fs::write(output_path, content).await.map_err(WortlautError::Io)?;

    info!("ASS caption file generated successfully");
    Ok(())
}

/// Format time in seconds to ASS time format (H:MM:SS.cc)
fn format_ass_time(seconds: f64) -> String {
    let total_centiseconds = (seconds * 100.0).round() as u64;
    let hours = total_centiseconds / 360_000;
    let minutes = (total_centiseconds % 360_000) / 6_000;
    let secs = (total_centiseconds % 6_000) / 100;
    let centis = total_centiseconds % 100;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}

/// Convert an RRGGBB hex string to the ASS &H00BBGGRR color form
fn ass_color(hex: &str) -> Result<String> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WortlautError::Config(format!(
            "Invalid color '{}', expected RRGGBB hex",
            hex
        )));
    }

    let (r, g, b) = (&hex[0..2], &hex[2..4], &hex[4..6]);
    Ok(format!("&H00{}{}{}", b, g, r).to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_format_ass_time() {
        assert_eq!(format_ass_time(0.0), "0:00:00.00");
        assert_eq!(format_ass_time(65.123), "0:01:05.12");
        assert_eq!(format_ass_time(3661.5), "1:01:01.50");
    }

    #[test]
    fn test_ass_color() {
        assert_eq!(ass_color("FFFFFF").unwrap(), "&H00FFFFFF");
        assert_eq!(ass_color("1E2D3C").unwrap(), "&H003C2D1E");
        assert_eq!(ass_color("#000000").unwrap(), "&H00000000");
        assert!(ass_color("red").is_err());
    }

    #[tokio::test]
    async fn test_generate_ass_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("captions.ass");
        let style = Config::default().render;

        let events = vec![
            CaptionEvent {
                start: 0.0,
                end: 1.5,
                text: "Hallo".to_string(),
            },
            CaptionEvent {
                start: 2.5,
                end: 4.0,
                text: "Privet".to_string(),
            },
        ];

        generate_ass(&events, &style, &path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("PlayResX: 1920"));
        assert!(content.contains(
            "Dialogue: 0,0:00:00.00,0:00:01.50,Default,,0,0,0,,{\\fad(500,500)}Hallo"
        ));
        assert!(content.contains(
            "Dialogue: 0,0:00:02.50,0:00:04.00,Default,,0,0,0,,{\\fad(500,500)}Privet"
        ));
    }
}
