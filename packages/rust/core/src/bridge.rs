//! Request boundary for enhancement messages.
//!
//! Hosts send `ENHANCE_PROMPT` messages as tagged JSON and receive one
//! `ENHANCE_RESPONSE` per request. Nothing fails past this boundary: invalid
//! input, undecodable JSON and panics inside enrichment all become failure
//! responses carrying the elapsed time.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info, instrument, warn};

use sparkle_shared::{AppConfig, PageContext, Platform, Result, SparkleError};

use crate::assembler::{EnrichOptions, enrich_prompt_with};
use crate::validator::{ValidationThresholds, validate_with};

/// Reported when a panic carries no message.
const UNKNOWN_ERROR: &str = "Unknown error occurred";

// ---------------------------------------------------------------------------
// Protocol types
// ---------------------------------------------------------------------------

/// A message crossing the boundary: `{"type": ..., "payload": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ExtensionMessage {
    #[serde(rename = "ENHANCE_PROMPT")]
    EnhancePrompt(EnhanceRequest),
    #[serde(rename = "ENHANCE_RESPONSE")]
    EnhanceResponse(EnhanceResponse),
}

/// Payload of `ENHANCE_PROMPT`. Every field may be absent on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    /// `None` when absent or not a JSON string.
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PageContext>,
    /// `None` when absent or null. Any other non-string is an unknown platform.
    #[serde(
        default,
        deserialize_with = "platform_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub platform: Option<Platform>,
}

fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

fn platform_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<Platform>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(Platform::from(s)),
        _ => Some(Platform::Unknown),
    })
}

/// Payload of `ENHANCE_RESPONSE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub processing_time_ms: f64,
}

impl EnhanceResponse {
    fn enriched(prompt: String, processing_time_ms: f64) -> Self {
        Self {
            success: true,
            enriched_prompt: Some(prompt),
            error: None,
            processing_time_ms,
        }
    }

    fn failure(error: impl Into<String>, processing_time_ms: f64) -> Self {
        Self {
            success: false,
            enriched_prompt: None,
            error: Some(error.into()),
            processing_time_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// Turns enhancement requests into responses.
///
/// Stateless between calls; one handler can serve any number of requests.
#[derive(Debug, Clone, Default)]
pub struct EnhanceHandler {
    default_platform: Platform,
    enrich: EnrichOptions,
    thresholds: ValidationThresholds,
}

impl From<&AppConfig> for EnhanceHandler {
    fn from(config: &AppConfig) -> Self {
        Self {
            default_platform: config.enrichment.default_platform,
            enrich: EnrichOptions::from(config),
            thresholds: ValidationThresholds::from(config),
        }
    }
}

impl EnhanceHandler {
    /// Handle one request.
    #[instrument(skip_all)]
    pub fn handle(&self, request: EnhanceRequest) -> EnhanceResponse {
        let start = Instant::now();
        let elapsed_ms = || start.elapsed().as_secs_f64() * 1000.0;

        let (user_text, context, platform) = match self.accept(request) {
            Ok(parts) => parts,
            Err(e) => {
                warn!(error = %e, "rejected enhancement request");
                return EnhanceResponse::failure(e.message(), elapsed_ms());
            }
        };

        let prompt = match guarded(start, || {
            enrich_prompt_with(&user_text, context, platform, &self.enrich)
        }) {
            Ok(prompt) => prompt,
            Err(failure) => return failure,
        };

        let processing_time_ms = elapsed_ms();
        info!(
            original_length = user_text.chars().count(),
            enriched_length = prompt.enriched.chars().count(),
            expansion_ratio = prompt.expansion_ratio,
            processing_time_ms = processing_time_ms.round(),
            within_budget = processing_time_ms < self.enrich.latency_budget_ms as f64,
            "enrichment completed"
        );

        let report = validate_with(&prompt, &self.thresholds);
        for issue in &report.issues {
            warn!(issue = %issue, "enriched prompt below quality threshold");
        }

        EnhanceResponse::enriched(prompt.enriched, processing_time_ms)
    }

    /// Handle a decoded message. Anything but `ENHANCE_PROMPT` is answered
    /// with a failure.
    pub fn handle_message(&self, message: ExtensionMessage) -> ExtensionMessage {
        let response = match message {
            ExtensionMessage::EnhancePrompt(request) => self.handle(request),
            ExtensionMessage::EnhanceResponse(_) => {
                EnhanceResponse::failure("Unsupported message type: ENHANCE_RESPONSE", 0.0)
            }
        };
        ExtensionMessage::EnhanceResponse(response)
    }

    /// Handle one JSON-encoded message and return the encoded response.
    ///
    /// Undecodable input becomes a failure response carrying the decoder's
    /// message; only encoding the response itself can fail.
    pub fn handle_json(&self, input: &str) -> Result<String> {
        let start = Instant::now();
        let response = match serde_json::from_str::<ExtensionMessage>(input) {
            Ok(message) => self.handle_message(message),
            Err(e) => {
                warn!(error = %e, "undecodable enhancement message");
                ExtensionMessage::EnhanceResponse(EnhanceResponse::failure(
                    e.to_string(),
                    start.elapsed().as_secs_f64() * 1000.0,
                ))
            }
        };
        serde_json::to_string(&response).map_err(|e| SparkleError::parse(e.to_string()))
    }

    /// Validate the request and fill in the default platform.
    fn accept(&self, request: EnhanceRequest) -> Result<(String, PageContext, Platform)> {
        let user_text = request
            .user_text
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SparkleError::validation("Missing or invalid user text"))?;
        let context = request
            .context
            .ok_or_else(|| SparkleError::validation("Missing page context"))?;
        let platform = request.platform.unwrap_or(self.default_platform);
        Ok((user_text, context, platform))
    }
}

/// Run `f`, turning a panic into a failure response timed from `start`.
fn guarded<T>(start: Instant, f: impl FnOnce() -> T) -> std::result::Result<T, EnhanceResponse> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        error!(error = %message, "enhancement failed");
        EnhanceResponse::failure(message, start.elapsed().as_secs_f64() * 1000.0)
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    if message.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}
