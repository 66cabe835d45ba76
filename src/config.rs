use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use crate::error::{Result, WortlautError};

// Default gaps between segments, in milliseconds
fn default_cell_gap_ms() -> u64 {
    1000
}

fn default_row_gap_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub table: TableConfig,
    pub sequence: SequenceConfig,
    pub tts: TtsConfig,
    pub media: MediaConfig,
    pub render: RenderConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Column keys in spreadsheet order (left to right)
    pub columns: Vec<String>,
    /// Maximum number of data rows to process (None = all rows)
    pub max_rows: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Silence inserted after each speech clip within a row
    #[serde(default = "default_cell_gap_ms")]
    pub cell_gap_ms: u64,
    /// Silence inserted between consecutive rows
    #[serde(default = "default_row_gap_ms")]
    pub row_gap_ms: u64,
    /// Per-level repeat rules: replay the source clip after its translation
    #[serde(default)]
    pub repeats: Vec<RepeatRule>,
}

/// Declarative repeat-on-translation rule for one level pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepeatRule {
    /// Column holding the source-language cell (e.g. "b1_de")
    pub source: String,
    /// Column holding the translation cell (e.g. "b1_ru")
    pub target: String,
    /// Whether to replay the source clip right after the translation clip
    pub repeat_source_after_target: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Base URL of the text-to-speech REST endpoint
    pub endpoint: String,
    /// API key; falls back to the GOOGLE_TTS_API_KEY environment variable
    pub api_key: Option<String>,
    /// Speaking rate passed to the synthesis request
    pub speaking_rate: f64,
    /// Pitch passed to the synthesis request
    pub pitch: f64,
    /// Voice lookup table keyed by column key
    pub voices: HashMap<String, VoiceProfile>,
}

/// A (language code, voice name) pair selected per column key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub language_code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary (clip duration measurement)
    pub probe_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Font family name for caption text
    pub font: String,
    pub font_size: u32,
    /// Caption text color as RRGGBB hex
    pub text_color: String,
    /// Background color as RRGGBB hex
    pub background_color: String,
    /// Caption fade in/out duration
    pub fade_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding synthesized and silence clips
    pub dir: String,
    /// Directory receiving final audio/video outputs
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        let mut voices = HashMap::new();
        voices.insert(
            "de".to_string(),
            VoiceProfile {
                language_code: "de-DE".to_string(),
                name: "de-DE-Studio-B".to_string(),
            },
        );
        voices.insert(
            "ru".to_string(),
            VoiceProfile {
                language_code: "ru-RU".to_string(),
                name: "ru-RU-Wavenet-D".to_string(),
            },
        );
        voices.insert(
            "b2_de".to_string(),
            VoiceProfile {
                language_code: "de-DE".to_string(),
                name: "de-DE-Studio-C".to_string(),
            },
        );
        voices.insert(
            "b2_ru".to_string(),
            VoiceProfile {
                language_code: "ru-RU".to_string(),
                name: "ru-RU-Wavenet-C".to_string(),
            },
        );

        Self {
            table: TableConfig {
                columns: vec![
                    "de".to_string(),
                    "ru".to_string(),
                    "b1_de".to_string(),
                    "b1_ru".to_string(),
                    "b2_de".to_string(),
                    "b2_ru".to_string(),
                ],
                max_rows: None,
            },
            sequence: SequenceConfig {
                cell_gap_ms: default_cell_gap_ms(),
                row_gap_ms: default_row_gap_ms(),
                repeats: vec![
                    RepeatRule {
                        source: "b1_de".to_string(),
                        target: "b1_ru".to_string(),
                        repeat_source_after_target: true,
                    },
                    RepeatRule {
                        source: "b2_de".to_string(),
                        target: "b2_ru".to_string(),
                        repeat_source_after_target: true,
                    },
                ],
            },
            tts: TtsConfig {
                endpoint: "https://texttospeech.googleapis.com".to_string(),
                api_key: None,
                speaking_rate: 1.0,
                pitch: 1.0,
                voices,
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                probe_path: "ffprobe".to_string(),
            },
            render: RenderConfig {
                width: 1920,
                height: 1080,
                fps: 30,
                font: "DejaVu Sans".to_string(),
                font_size: 60,
                text_color: "FFFFFF".to_string(),
                background_color: "1E1E1E".to_string(),
                fade_ms: 500,
            },
            cache: CacheConfig {
                dir: "components".to_string(),
                output_dir: "output".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WortlautError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| WortlautError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| WortlautError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| WortlautError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

impl TtsConfig {
    /// Resolve the voice for a column key. Falls back to the entry for the
    /// column's language suffix (e.g. "b1_de" -> "de") when no exact entry
    /// exists.
    pub fn voice_for(&self, column: &str) -> Result<&VoiceProfile> {
        if let Some(profile) = self.voices.get(column) {
            return Ok(profile);
        }

        let suffix = column.rsplit('_').next().unwrap_or(column);
        self.voices.get(suffix).ok_or_else(|| {
            WortlautError::Config(format!("No voice configured for column '{}'", column))
        })
    }

    /// Resolve the API key from config or environment
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }

        std::env::var("GOOGLE_TTS_API_KEY").map_err(|_| {
            WortlautError::Config(
                "No TTS API key: set tts.api_key or GOOGLE_TTS_API_KEY".to_string(),
            )
        })
    }
}
