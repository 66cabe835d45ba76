// Modular media processing architecture
//
// This module provides a clean abstraction over the ffmpeg/ffprobe
// operations the renderer needs:
// - Processor: concrete implementation driving the binaries
// - Commands: command builders and abstractions

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use commands::*;
pub use processor::*;

use crate::config::{MediaConfig, RenderConfig};
use crate::error::Result;

/// Main trait for media processing operations
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Generate a fixed-duration silence clip
    async fn make_silence(&self, output_path: &Path, duration_ms: u64) -> Result<()>;

    /// Concatenate audio clips into a single track
    async fn concat_audio(&self, clip_paths: &[PathBuf], output_path: &Path) -> Result<()>;

    /// Measure the playback duration of a media file in seconds
    async fn probe_duration(&self, path: &Path) -> Result<f64>;

    /// Render a caption video over a solid background with the audio
    /// track muxed in
    async fn render_caption_video(
        &self,
        caption_path: &Path,
        audio_path: &Path,
        output_path: &Path,
        render: &RenderConfig,
        duration: f64,
    ) -> Result<()>;

    /// Check if the media tools are available
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (ffmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
