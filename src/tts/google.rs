use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{TtsConfig, VoiceProfile};
use crate::error::{Result, WortlautError};
use super::Synthesizer;

/// Client for the Google Cloud Text-to-Speech REST API
pub struct GoogleCloudSynthesizer {
    client: Client,
    endpoint: String,
    api_key: String,
    speaking_rate: f64,
    pitch: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f64,
    pitch: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

impl GoogleCloudSynthesizer {
    pub fn new(config: TtsConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;

        Ok(Self {
            client: Client::new(),
            endpoint: config.endpoint,
            api_key,
            speaking_rate: config.speaking_rate,
            pitch: config.pitch,
        })
    }
}

#[async_trait]
impl Synthesizer for GoogleCloudSynthesizer {
    async fn synthesize(&self, text: &str, voice: &VoiceProfile) -> Result<Vec<u8>> {
        info!("Synthesizing {} chars with voice {}", text.len(), voice.name);

        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &voice.language_code,
                name: &voice.name,
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: self.speaking_rate,
                pitch: self.pitch,
            },
        };

        let url = format!("{}/v1/text:synthesize", self.endpoint);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WortlautError::Synthesis(format!(
                "Synthesis request failed {}: {}",
                status, body
            )));
        }

        let payload: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| WortlautError::Synthesis(format!("Invalid synthesis response: {}", e)))?;

        base64::engine::general_purpose::STANDARD
            .decode(&payload.audio_content)
            .map_err(|e| {
                WortlautError::Synthesis(format!("Failed to decode audio payload: {}", e))
            })
    }
}
