use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::config::{MediaConfig, RenderConfig};
use crate::error::{Result, WortlautError};
use super::{MediaCommandBuilder, MediaProcessorTrait};

/// Concrete implementation of media processor (ffmpeg/ffprobe-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    ffmpeg: MediaCommandBuilder,
    ffprobe: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let ffmpeg = MediaCommandBuilder::new(&config.binary_path);
        let ffprobe = MediaCommandBuilder::new(&config.probe_path);

        Self {
            config,
            ffmpeg,
            ffprobe,
        }
    }

    /// Write an ffmpeg concat-demuxer list file for the given clips
    fn write_concat_list(clip_paths: &[PathBuf]) -> Result<tempfile::NamedTempFile> {
        let mut list = tempfile::Builder::new()
            .suffix(".txt")
            .tempfile()
            .map_err(|e| WortlautError::Media(format!("Failed to create concat list: {}", e)))?;

        for path in clip_paths {
            let absolute = std::fs::canonicalize(path)
                .map_err(|e| WortlautError::Media(format!("Failed to resolve clip path: {}", e)))?;
            // concat demuxer single-quote escaping
            let escaped = absolute.to_string_lossy().replace('\'', "'\\''");
            writeln!(list, "file '{}'", escaped)
                .map_err(|e| WortlautError::Media(format!("Failed to write concat list: {}", e)))?;
        }

        list.flush()
            .map_err(|e| WortlautError::Media(format!("Failed to flush concat list: {}", e)))?;
        Ok(list)
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn make_silence(&self, output_path: &Path, duration_ms: u64) -> Result<()> {
        info!(
            "Generating {}ms silence clip: {}",
            duration_ms,
            output_path.display()
        );

        let command = self.ffmpeg.silence_clip(output_path, duration_ms);
        command.execute().await
    }

    async fn concat_audio(&self, clip_paths: &[PathBuf], output_path: &Path) -> Result<()> {
        if clip_paths.is_empty() {
            return Err(WortlautError::Media(
                "No clips to concatenate".to_string(),
            ));
        }

        info!(
            "Concatenating {} clips into {}",
            clip_paths.len(),
            output_path.display()
        );

        let list = Self::write_concat_list(clip_paths)?;
        let command = self
            .ffmpeg
            .concat_clips(list.path(), output_path);
        command.execute().await?;

        info!("Audio concatenation completed");
        Ok(())
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64> {
        debug!("Probing duration of {}", path.display());

        let command = self.ffprobe.probe_duration(path);
        let stdout = command.execute_capture().await?;

        stdout.trim().parse::<f64>().map_err(|e| {
            WortlautError::Media(format!(
                "Unexpected ffprobe output '{}': {}",
                stdout.trim(),
                e
            ))
        })
    }

    async fn render_caption_video(
        &self,
        caption_path: &Path,
        audio_path: &Path,
        output_path: &Path,
        render: &RenderConfig,
        duration: f64,
    ) -> Result<()> {
        info!(
            "Rendering caption video {} ({}x{}, {:.1}s)",
            output_path.display(),
            render.width,
            render.height,
            duration
        );

        let command = self.ffmpeg.caption_video(
            caption_path,
            audio_path,
            output_path,
            render,
            duration,
        );
        command.execute().await?;

        info!("Caption video rendering completed");
        Ok(())
    }

    fn check_availability(&self) -> Result<()> {
        for binary in [&self.config.binary_path, &self.config.probe_path] {
            let output = Command::new(binary)
                .arg("-version")
                .output()
                .map_err(|e| WortlautError::Media(format!("{} not found: {}", binary, e)))?;

            if !output.status.success() {
                return Err(WortlautError::Media(format!(
                    "{} version check failed",
                    binary
                )));
            }
        }

        info!("Media tools are available");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_list_quotes_paths() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("de_1.mp3");
        std::fs::write(&clip, b"x").unwrap();

        let list = MediaProcessorImpl::write_concat_list(&[clip.clone()]).unwrap();
        let content = std::fs::read_to_string(list.path()).unwrap();

        assert!(content.starts_with("file '"));
        assert!(content.contains("de_1.mp3"));
    }

    #[test]
    fn test_concat_list_missing_clip_fails() {
        let missing = PathBuf::from("no/such/clip.mp3");
        assert!(MediaProcessorImpl::write_concat_list(&[missing]).is_err());
    }
}
