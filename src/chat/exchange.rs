//! The completion orchestrator: builds the outbound request from the
//! transcript, calls the completion service, applies the result, and
//! converts failures into user-facing messages at the exchange boundary.
use anyhow::Error;
use thiserror::Error as ThisError;

use crate::audio;
use crate::chat::format;
use crate::chat::models::ConversationState;
use crate::chat::quota;
use crate::core::AppConfig;
use crate::openai::{SamplingParams, completion, transcription};
use crate::persona::Persona;

/// Per-request failures. All are non-fatal: the conversation stays
/// usable on the next turn.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
    #[error("completion request failed")]
    Upstream(#[source] Error),
    #[error("completion response contained no assistant message")]
    EmptyResponse,
    #[error("audio processing failed")]
    Audio(#[source] Error),
}

/// The personal API key, when set, takes precedence over the platform
/// default. Resolved here and nowhere else.
fn effective_api_key<'a>(state: &'a ConversationState, config: &'a AppConfig) -> &'a str {
    state.api_key.as_deref().unwrap_or(&config.openai_api_key)
}

/// Builds the user turn. The terse-replies toggle and the active persona
/// influence the prompt only here.
fn compose_prompt(input: &str, terse: bool, persona: &Persona) -> String {
    format!(
        "{}. {} Answer as: {}. Don't mention the mode in your answer.",
        input,
        if terse { "Skip prose." } else { "" },
        persona.name
    )
}

/// Runs one text exchange: appends the user turn, requests the next
/// completion, and on success applies the assistant turn and counts the
/// usage. A failed completion leaves the already-appended user turn in
/// the transcript so conversational continuity survives transient
/// failures; usage count and the rest of the transcript are untouched.
///
/// Returns the assistant's raw text; rendering is the caller's job.
pub async fn exchange(
    state: &mut ConversationState,
    input: &str,
    config: &AppConfig,
) -> Result<String, ExchangeError> {
    let persona = state.persona();

    state.transcript.ensure_initialized(persona);
    let prompt = compose_prompt(input, state.terse_replies, persona);
    state.transcript.append_user(&prompt);

    let resp = completion(
        state.transcript.messages(),
        SamplingParams::default(),
        &config.openai_api_hostname,
        effective_api_key(state, config),
        &config.chat_model,
    )
    .await
    .map_err(ExchangeError::Upstream)?;

    let Some(reply) = resp["choices"][0]["message"]["content"].as_str() else {
        return Err(ExchangeError::EmptyResponse);
    };

    state.transcript.append_assistant(reply);
    state.usage_count += 1;

    Ok(reply.to_string())
}

/// Runs one voice exchange: converts the clip to a format the
/// transcription service accepts, transcribes it, then continues down
/// the same path as a text exchange. Audio failures happen before any
/// transcript mutation.
pub async fn voice_exchange(
    state: &mut ConversationState,
    voice: Vec<u8>,
    config: &AppConfig,
) -> Result<String, ExchangeError> {
    let converted = audio::convert(voice, "mp3")
        .await
        .map_err(ExchangeError::Audio)?;

    let text = transcription(
        converted,
        "voice.mp3",
        &config.openai_api_hostname,
        effective_api_key(state, config),
        &config.transcription_model,
    )
    .await
    .map_err(ExchangeError::Audio)?;

    exchange(state, &text, config).await
}

fn quota_message(limit: u32) -> String {
    format!(
        "You have reached the limit of {} messages without an OpenAI API token. \
         You can easily get a token for free at https://platform.openai.com/account/api-keys",
        limit
    )
}

const COMPLETION_FAILED_MESSAGE: &str = "Error getting completion from ChatGPT";
const VOICE_FAILED_MESSAGE: &str = "Could not process your voice message. Please try again.";

/// Handles one inbound text message end to end: quota gate, exchange,
/// rendering. Every failure is converted to a user-facing message here;
/// nothing propagates past the exchange boundary.
pub async fn handle_text(
    state: &mut ConversationState,
    text: &str,
    config: &AppConfig,
) -> String {
    if !quota::may_proceed(state, config.free_message_limit) {
        return quota_message(config.free_message_limit);
    }

    match exchange(state, text, config).await {
        Ok(reply) => format::render(&reply, state.persona()),
        Err(err) => {
            tracing::error!("Text exchange failed: {:#}", Error::from(err));
            COMPLETION_FAILED_MESSAGE.to_string()
        }
    }
}

/// Handles one inbound voice message end to end. Same policy as
/// `handle_text`, with a distinct message for audio-pipeline failures.
pub async fn handle_voice(
    state: &mut ConversationState,
    voice: Vec<u8>,
    config: &AppConfig,
) -> String {
    if !quota::may_proceed(state, config.free_message_limit) {
        return quota_message(config.free_message_limit);
    }

    match voice_exchange(state, voice, config).await {
        Ok(reply) => format::render(&reply, state.persona()),
        Err(err @ ExchangeError::Audio(_)) => {
            tracing::error!("Voice exchange failed: {:#}", Error::from(err));
            VOICE_FAILED_MESSAGE.to_string()
        }
        Err(err) => {
            tracing::error!("Voice exchange failed: {:#}", Error::from(err));
            COMPLETION_FAILED_MESSAGE.to_string()
        }
    }
}
