//! Wortlaut - Vocabulary Audio/Video Track Builder
//!
//! Reads a vocabulary table, plans a deterministic sequence of speech and
//! silence segments, synthesizes per-cell clips through a cloud TTS API
//! with a filesystem cache, and renders audio tracks and caption videos
//! via ffmpeg.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod table;
pub mod sequence;
pub mod tts;
pub mod cache;
pub mod captions;
pub mod media;
pub mod render;
pub mod error;
