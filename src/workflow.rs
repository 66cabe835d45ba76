use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cache::ClipCache;
use crate::config::Config;
use crate::error::Result;
use crate::media::MediaProcessorFactory;
use crate::render::Renderer;
use crate::sequence::{assemble, sequence_row, FinalSequence};
use crate::table::{self, VocabRow};
use crate::tts::SynthesizerFactory;

/// Orchestrates a full run: table in, audio/video tracks out
pub struct Workflow {
    config: Config,
    renderer: Renderer,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let synthesizer = SynthesizerFactory::create_default(config.tts.clone())?;
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        // Check dependencies
        media.check_availability()?;

        let cache = ClipCache::new(&config.cache.dir)?;
        std::fs::create_dir_all(&config.cache.output_dir)?;

        let renderer = Renderer::new(
            cache,
            synthesizer,
            media,
            config.tts.clone(),
            config.render.clone(),
        );

        Ok(Self { config, renderer })
    }

    #[cfg(test)]
    fn with_renderer(config: Config, renderer: Renderer) -> Self {
        Self { config, renderer }
    }

    /// Build the final audio track, optionally one clip per row as well
    pub async fn build_audio(
        &self,
        input: &Path,
        output: Option<&Path>,
        per_row: bool,
    ) -> Result<()> {
        info!("Building audio track from {}", input.display());

        let rows = self.read_rows(input)?;
        let sequence = self.plan(&rows);

        if sequence.is_empty() {
            warn!("No non-empty rows/cells were found for audio generation");
            return Ok(());
        }

        if per_row {
            self.build_row_tracks(&rows).await;
        }

        let output_path = self.output_path(output, "final.mp3");
        self.renderer.render_audio(&sequence, &output_path).await?;

        Ok(())
    }

    /// Build the final audio track plus the caption video
    pub async fn build_video(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        info!("Building caption video from {}", input.display());

        let rows = self.read_rows(input)?;
        let sequence = self.plan(&rows);

        if sequence.is_empty() {
            warn!("No non-empty rows/cells were found for video generation");
            return Ok(());
        }

        let audio_path = self.output_path(None, "final.mp3");
        let video_path = self.output_path(output, "final.mp4");
        self.renderer
            .render_video(&sequence, &audio_path, &video_path)
            .await?;

        Ok(())
    }

    /// Render one audio file per non-empty row. Row failures are logged
    /// and do not abort the remaining rows.
    async fn build_row_tracks(&self, rows: &[VocabRow]) {
        let limit = self.config.table.max_rows.unwrap_or(usize::MAX);

        for row in rows.iter().take(limit) {
            let row_sequence = sequence_row(row, &self.config.table.columns, &self.config.sequence);
            if row_sequence.is_empty() {
                continue;
            }

            let path = self.output_path(None, &format!("audio_{}.mp3", row.index));
            info!("Rendering row {}: {}", row.index, row.display_text());
            match self.renderer.render_audio(&row_sequence, &path).await {
                Ok(_) => info!("Row {} audio created: {}", row.index, path.display()),
                Err(e) => warn!("Failed to render row {}: {}", row.index, e),
            }
        }
    }

    fn read_rows(&self, input: &Path) -> Result<Vec<VocabRow>> {
        table::read_rows(input, &self.config.table.columns)
    }

    fn plan(&self, rows: &[VocabRow]) -> FinalSequence {
        assemble(
            rows,
            &self.config.table.columns,
            &self.config.sequence,
            self.config.table.max_rows,
        )
    }

    fn output_path(&self, explicit: Option<&Path>, default_name: &str) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => Path::new(&self.config.cache.output_dir).join(default_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;

    use crate::config::{RenderConfig, VoiceProfile};
    use crate::error::WortlautError;
    use crate::media::MediaProcessorTrait;
    use crate::tts::Synthesizer;

    struct EchoSynthesizer;

    #[async_trait]
    impl Synthesizer for EchoSynthesizer {
        async fn synthesize(&self, text: &str, _voice: &VoiceProfile) -> Result<Vec<u8>> {
            Ok(text.as_bytes().to_vec())
        }
    }

    struct FakeMedia;

    #[async_trait]
    impl MediaProcessorTrait for FakeMedia {
        async fn make_silence(&self, output_path: &Path, _duration_ms: u64) -> Result<()> {
            tokio::fs::write(output_path, b"silence").await?;
            Ok(())
        }

        async fn concat_audio(
            &self,
            clip_paths: &[PathBuf],
            output_path: &Path,
        ) -> Result<()> {
            tokio::fs::write(output_path, format!("{} clips", clip_paths.len())).await?;
            Ok(())
        }

        async fn probe_duration(&self, _path: &Path) -> Result<f64> {
            Ok(1.0)
        }

        async fn render_caption_video(
            &self,
            caption_path: &Path,
            _audio_path: &Path,
            output_path: &Path,
            _render: &RenderConfig,
            _duration: f64,
        ) -> Result<()> {
            if !caption_path.exists() {
                return Err(WortlautError::Media("caption file missing".to_string()));
            }
            tokio::fs::write(output_path, b"mp4").await?;
            Ok(())
        }

        fn check_availability(&self) -> Result<()> {
            Ok(())
        }
    }

    fn workflow(dir: &Path) -> Workflow {
        let mut config = Config::default();
        config.cache.dir = dir.join("components").display().to_string();
        config.cache.output_dir = dir.join("output").display().to_string();
        std::fs::create_dir_all(&config.cache.output_dir).unwrap();

        let renderer = Renderer::new(
            ClipCache::new(&config.cache.dir).unwrap(),
            Box::new(EchoSynthesizer),
            Box::new(FakeMedia),
            config.tts.clone(),
            config.render.clone(),
        );

        Workflow::with_renderer(config, renderer)
    }

    fn write_vocab(dir: &Path) -> PathBuf {
        let path = dir.join("vocab.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "de,ru,b1_de,b1_ru,b2_de,b2_ru").unwrap();
        writeln!(file, "Hallo,Privet,Haus,Dom,,").unwrap();
        writeln!(file, ",,,,,").unwrap();
        writeln!(file, "Welt,Mir,,,,").unwrap();
        path
    }

    #[tokio::test]
    async fn test_build_audio_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(dir.path());
        let vocab = write_vocab(dir.path());

        workflow.build_audio(&vocab, None, false).await.unwrap();

        assert!(dir.path().join("output/final.mp3").exists());
        // all spoken cells landed in the cache
        assert!(dir.path().join("components/de_1.mp3").exists());
        assert!(dir.path().join("components/b1_ru_1.mp3").exists());
        assert!(dir.path().join("components/de_3.mp3").exists());
    }

    #[tokio::test]
    async fn test_build_audio_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(dir.path());
        let vocab = write_vocab(dir.path());

        workflow.build_audio(&vocab, None, true).await.unwrap();

        assert!(dir.path().join("output/audio_1.mp3").exists());
        // blank row produces no per-row file
        assert!(!dir.path().join("output/audio_2.mp3").exists());
        assert!(dir.path().join("output/audio_3.mp3").exists());
        assert!(dir.path().join("output/final.mp3").exists());
    }

    #[tokio::test]
    async fn test_build_video_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(dir.path());
        let vocab = write_vocab(dir.path());

        workflow.build_video(&vocab, None).await.unwrap();

        assert!(dir.path().join("output/final.mp3").exists());
        assert!(dir.path().join("output/final.mp4").exists());
        assert!(dir.path().join("output/final.ass").exists());
    }

    #[tokio::test]
    async fn test_empty_table_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow(dir.path());

        let vocab = dir.path().join("vocab.csv");
        let mut file = std::fs::File::create(&vocab).unwrap();
        writeln!(file, "de,ru,b1_de,b1_ru,b2_de,b2_ru").unwrap();
        writeln!(file, ",,,,,").unwrap();

        workflow.build_audio(&vocab, None, false).await.unwrap();
        assert!(!dir.path().join("output/final.mp3").exists());
    }

    #[tokio::test]
    async fn test_max_rows_limits_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = workflow(dir.path());
        workflow.config.table.max_rows = Some(1);
        let vocab = write_vocab(dir.path());

        workflow.build_audio(&vocab, None, false).await.unwrap();

        assert!(dir.path().join("components/de_1.mp3").exists());
        assert!(!dir.path().join("components/de_3.mp3").exists());
    }
}
