// Modular speech synthesis architecture
//
// This module provides speech synthesis implementations through a factory
// pattern. To add a new synthesis service:
// 1. Create service-specific request/response structures
// 2. Implement the Synthesizer trait for your service
// 3. Add the service to SynthesizerImplementation
// 4. Update the factory to create your implementation

pub mod google;

use async_trait::async_trait;

use crate::config::{TtsConfig, VoiceProfile};
use crate::error::Result;

/// Main trait for speech synthesis operations
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize text with the given voice, returning encoded audio bytes
    async fn synthesize(&self, text: &str, voice: &VoiceProfile) -> Result<Vec<u8>>;
}

/// Synthesizer implementation type
#[derive(Debug, Clone)]
pub enum SynthesizerImplementation {
    GoogleCloud,
    // Future implementations can be added here:
    // Azure,
    // ElevenLabs,
}

/// Factory for creating synthesizer instances
pub struct SynthesizerFactory;

impl SynthesizerFactory {
    /// Create a synthesizer based on implementation type
    pub fn create_synthesizer(
        implementation: SynthesizerImplementation,
        config: TtsConfig,
    ) -> Result<Box<dyn Synthesizer>> {
        match implementation {
            SynthesizerImplementation::GoogleCloud => {
                Ok(Box::new(google::GoogleCloudSynthesizer::new(config)?))
            }
        }
    }

    /// Create with the default implementation (Google Cloud TTS)
    pub fn create_default(config: TtsConfig) -> Result<Box<dyn Synthesizer>> {
        Self::create_synthesizer(SynthesizerImplementation::GoogleCloud, config)
    }
}
