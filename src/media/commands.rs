use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::config::RenderConfig;
use crate::error::{Result, WortlautError};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add a lavfi-generated input (anullsrc, color, ...)
    pub fn lavfi_input<S: Into<String>>(self, source: S) -> Self {
        self.arg("-f").arg("lavfi").arg("-i").arg(source)
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Limit output duration in seconds
    pub fn duration(self, seconds: f64) -> Self {
        self.arg("-t").arg(format!("{:.3}", seconds))
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Set audio sample rate
    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Execute the command, discarding output
    pub async fn execute(&self) -> Result<()> {
        self.run().map(|_| ())
    }

    /// Execute the command and capture stdout
    pub async fn execute_capture(&self) -> Result<String> {
        let stdout = self.run()?;
        Ok(String::from_utf8_lossy(&stdout).to_string())
    }

    fn run(&self) -> Result<Vec<u8>> {
        debug!(
            "Executing media processing command: {} {:?}",
            self.binary_path, self.args
        );
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .map_err(|e| {
                WortlautError::Media(format!("Failed to execute media processor: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WortlautError::Media(format!(
                "{} failed: {}",
                self.description, stderr
            )));
        }

        Ok(output.stdout)
    }
}

/// Builder for the media operations used by the renderer
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build a command generating a fixed-duration mono silence clip
    pub fn silence_clip<P: AsRef<Path>>(&self, output_path: P, duration_ms: u64) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Silence clip generation")
            .lavfi_input("anullsrc=r=44100:cl=mono")
            .duration(duration_ms as f64 / 1000.0)
            .audio_codec("libmp3lame")
            .overwrite()
            .output(output_path)
    }

    /// Build a command concatenating clips listed in a concat-demuxer
    /// list file into one audio track. Clips are re-encoded so mixed
    /// sample rates concatenate cleanly.
    pub fn concat_clips<P: AsRef<Path>>(&self, list_path: P, output_path: P) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio concatenation")
            .arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .input(list_path)
            .audio_sample_rate(44100)
            .audio_codec("libmp3lame")
            .arg("-q:a")
            .arg("2")
            .overwrite()
            .output(output_path)
    }

    /// Build a command rendering a solid background video with burned-in
    /// captions and the audio track muxed in.
    pub fn caption_video<P: AsRef<Path>>(
        &self,
        caption_path: P,
        audio_path: P,
        output_path: P,
        render: &RenderConfig,
        duration: f64,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Caption video rendering")
            .lavfi_input(format!(
                "color=c=0x{}:s={}x{}:r={}",
                render.background_color.trim_start_matches('#'),
                render.width,
                render.height,
                render.fps
            ))
            .input(audio_path)
            .video_filter(format!(
                "subtitles={}",
                caption_path.as_ref().display()
            ))
            .duration(duration)
            .video_codec("libx264")
            .arg("-pix_fmt")
            .arg("yuv420p")
            .audio_codec("aac")
            .arg("-shortest")
            .overwrite()
            .output(output_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }

    /// Build a duration probe command (ffprobe)
    pub fn probe_duration<P: AsRef<Path>>(&self, path: P) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Duration probe")
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(path.as_ref().to_string_lossy().to_string())
    }
}
