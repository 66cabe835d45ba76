use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cache::{ClipCache, ClipKey};
use crate::captions::{generate_ass, CaptionEvent};
use crate::config::{RenderConfig, TtsConfig};
use crate::error::{Result, WortlautError};
use crate::media::MediaProcessorTrait;
use crate::sequence::Segment;
use crate::tts::Synthesizer;

/// A segment resolved to a concrete audio asset on disk
#[derive(Debug, Clone)]
pub struct ResolvedSegment {
    pub segment: Segment,
    pub path: PathBuf,
}

/// Turns planned segment sequences into audio tracks and caption videos.
///
/// Speech segments resolve through the clip cache, synthesizing on a
/// miss. Repeat segments replay the cached source clip and never
/// synthesize. Per-segment failures are logged and skipped so a single
/// bad cell does not abort the run.
pub struct Renderer {
    cache: ClipCache,
    synthesizer: Box<dyn Synthesizer>,
    media: Box<dyn MediaProcessorTrait>,
    tts: TtsConfig,
    render: RenderConfig,
}

impl Renderer {
    pub fn new(
        cache: ClipCache,
        synthesizer: Box<dyn Synthesizer>,
        media: Box<dyn MediaProcessorTrait>,
        tts: TtsConfig,
        render: RenderConfig,
    ) -> Self {
        Self {
            cache,
            synthesizer,
            media,
            tts,
            render,
        }
    }

    /// Resolve every segment to an audio asset, skipping segments whose
    /// clip cannot be produced.
    pub async fn resolve_sequence(&self, sequence: &[Segment]) -> Result<Vec<ResolvedSegment>> {
        let progress = ProgressBar::new(sequence.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress.set_message("Resolving segments");

        let mut resolved = Vec::new();

        for segment in sequence {
            match self.resolve_segment(segment).await {
                Ok(Some(path)) => resolved.push(ResolvedSegment {
                    segment: segment.clone(),
                    path,
                }),
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping segment {:?}: {}", segment, e);
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(resolved)
    }

    async fn resolve_segment(&self, segment: &Segment) -> Result<Option<PathBuf>> {
        match segment {
            Segment::Speech { column, row, text } => {
                let voice = self.tts.voice_for(column)?;
                let key = ClipKey::new(column.clone(), *row);
                let path = self
                    .cache
                    .get_or_create(&key, move || async move {
                        self.synthesizer.synthesize(text, voice).await
                    })
                    .await?;
                Ok(Some(path))
            }
            Segment::Repeat { column, row } => {
                let key = ClipKey::new(column.clone(), *row);
                match self.cache.get(&key) {
                    Some(path) => Ok(Some(path)),
                    None => {
                        // source cell failed earlier in this run; replaying
                        // would mean a second synthesis, so drop the repeat
                        warn!("Missing cached clip for repeat of {}_{}", column, row);
                        Ok(None)
                    }
                }
            }
            Segment::Silence { duration_ms } => {
                let path = self
                    .cache
                    .get_or_create_silence(*duration_ms, move |path| async move {
                        self.media.make_silence(&path, *duration_ms).await
                    })
                    .await?;
                Ok(Some(path))
            }
        }
    }

    /// Render a sequence into a single audio track
    pub async fn render_audio(&self, sequence: &[Segment], output_path: &Path) -> Result<()> {
        let resolved = self.resolve_sequence(sequence).await?;
        self.concat_resolved(&resolved, output_path).await
    }

    async fn concat_resolved(
        &self,
        resolved: &[ResolvedSegment],
        output_path: &Path,
    ) -> Result<()> {
        if resolved.is_empty() {
            return Err(WortlautError::Media(
                "No clips resolved, nothing to render".to_string(),
            ));
        }

        let paths: Vec<PathBuf> = resolved.iter().map(|r| r.path.clone()).collect();
        self.media.concat_audio(&paths, output_path).await?;

        info!("Audio track created: {}", output_path.display());
        Ok(())
    }

    /// Render a sequence into an audio track plus a caption video whose
    /// on-screen text follows each clip's measured playback duration.
    pub async fn render_video(
        &self,
        sequence: &[Segment],
        audio_path: &Path,
        video_path: &Path,
    ) -> Result<()> {
        let resolved = self.resolve_sequence(sequence).await?;
        self.concat_resolved(&resolved, audio_path).await?;

        let (events, total_duration) = self.layout_captions(&resolved).await?;

        let caption_path = video_path.with_extension("ass");
        generate_ass(&events, &self.render, &caption_path).await?;

        self.media
            .render_caption_video(
                &caption_path,
                audio_path,
                video_path,
                &self.render,
                total_duration,
            )
            .await?;

        info!("Caption video created: {}", video_path.display());
        Ok(())
    }

    /// Lay out caption events cumulatively over the resolved clips.
    /// Returns the events and the total track duration in seconds.
    pub async fn layout_captions(
        &self,
        resolved: &[ResolvedSegment],
    ) -> Result<(Vec<CaptionEvent>, f64)> {
        // repeats display the text of the speech clip they replay
        let mut texts: HashMap<(&str, usize), &str> = HashMap::new();
        for item in resolved {
            if let Segment::Speech { column, row, text } = &item.segment {
                texts.insert((column.as_str(), *row), text.as_str());
            }
        }

        let mut events = Vec::new();
        let mut current_time = 0.0;

        for item in resolved {
            let duration = self.media.probe_duration(&item.path).await?;

            let text = match &item.segment {
                Segment::Speech { text, .. } => Some(text.as_str()),
                Segment::Repeat { column, row } => {
                    texts.get(&(column.as_str(), *row)).copied()
                }
                Segment::Silence { .. } => None,
            };

            if let Some(text) = text {
                events.push(CaptionEvent {
                    start: current_time,
                    end: current_time + duration,
                    text: text.to_string(),
                });
            }

            current_time += duration;
        }

        Ok((events, current_time))
    }
}
