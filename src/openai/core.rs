use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// Sampling configuration sent with every completion request. The values
/// are fixed product-wide rather than tunable per conversation.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct SamplingParams {
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            temperature: 0.6,
            max_tokens: 1000,
            top_p: 1.0,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(flatten)]
    params: SamplingParams,
}

/// Requests the next chat completion for the given transcript. Returns
/// the raw response payload; callers extract the assistant message. No
/// retry is attempted and the request timeout is the client's own.
pub async fn completion(
    messages: &[Message],
    params: SamplingParams,
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<Value, Error> {
    let payload = CompletionRequest {
        model,
        messages,
        params,
    };
    let url = format!("{}/v1/chat/completions", api_hostname.trim_end_matches("/"));
    let response = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60 * 10))
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response)
}

/// Transcribes an audio clip by uploading it to the transcription
/// endpoint. The clip must already be in a format the service accepts
/// (see `crate::audio` for conversion).
pub async fn transcription(
    audio: Vec<u8>,
    file_name: &str,
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<String, Error> {
    let part = reqwest::multipart::Part::bytes(audio).file_name(file_name.to_string());
    let form = reqwest::multipart::Form::new()
        .part("file", part)
        .text("model", model.to_string());

    let url = format!(
        "{}/v1/audio/transcriptions",
        api_hostname.trim_end_matches("/")
    );
    let response: Value = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .timeout(Duration::from_secs(60 * 10))
        .multipart(form)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    response["text"]
        .as_str()
        .map(str::to_string)
        .ok_or(anyhow!("Transcription response missing text: {}", response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), r#""system""#);
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            r#""assistant""#
        );
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
    }

    #[test]
    fn test_role_deserialization() {
        let json = r#""system""#;
        assert_eq!(serde_json::from_str::<Role>(json).unwrap(), Role::System);

        let json = r#""assistant""#;
        assert_eq!(serde_json::from_str::<Role>(json).unwrap(), Role::Assistant);

        let json = r#""user""#;
        assert_eq!(serde_json::from_str::<Role>(json).unwrap(), Role::User);
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::new(Role::User, "Hello world");
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"role":"user","content":"Hello world"}"#
        );
    }

    #[test]
    fn test_sampling_params_defaults() {
        let params = serde_json::to_value(SamplingParams::default()).unwrap();
        assert_eq!(params["frequency_penalty"], 0.0);
        assert_eq!(params["presence_penalty"], 0.0);
        assert_eq!(params["temperature"], 0.6);
        assert_eq!(params["max_tokens"], 1000);
        assert_eq!(params["top_p"], 1.0);
    }

    #[test]
    fn test_completion_request_flattens_params() {
        let messages = vec![Message::new(Role::User, "Hi")];
        let request = CompletionRequest {
            model: "gpt-3.5-turbo",
            messages: &messages,
            params: SamplingParams::default(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["temperature"], 0.6);
        assert_eq!(json["max_tokens"], 1000);
    }

    #[tokio::test]
    async fn test_completion_basic() {
        let mut server = mockito::Server::new_async().await;

        let response_body = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1694268190,
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Hello!"
                },
                "finish_reason": "stop"
            }]
        }"#;

        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response_body)
            .create();

        let messages = vec![Message::new(Role::User, "Hi")];
        let result = completion(
            &messages,
            SamplingParams::default(),
            server.url().as_str(),
            "test-key",
            "gpt-3.5-turbo",
        )
        .await;

        mock.assert();
        assert!(result.is_ok());

        let json = result.unwrap();
        assert_eq!(json["choices"][0]["message"]["content"], "Hello!");
    }

    #[tokio::test]
    async fn test_completion_upstream_error_status() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"message": "Rate limit exceeded"}}"#)
            .create();

        let messages = vec![Message::new(Role::User, "Hi")];
        let result = completion(
            &messages,
            SamplingParams::default(),
            server.url().as_str(),
            "test-key",
            "gpt-3.5-turbo",
        )
        .await;

        mock.assert();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_transcription_basic() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/v1/audio/transcriptions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"text": "What is the capital of France?"}"#)
            .create();

        let result = transcription(
            vec![0u8; 16],
            "voice.mp3",
            server.url().as_str(),
            "test-key",
            "whisper-1",
        )
        .await;

        mock.assert();
        assert_eq!(result.unwrap(), "What is the capital of France?");
    }

    #[tokio::test]
    async fn test_transcription_missing_text() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/v1/audio/transcriptions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"unexpected": true}"#)
            .create();

        let result = transcription(
            vec![0u8; 16],
            "voice.mp3",
            server.url().as_str(),
            "test-key",
            "whisper-1",
        )
        .await;

        mock.assert();
        assert!(result.is_err());
    }
}
