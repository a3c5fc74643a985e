use std::env;

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub chat_model: String,
    pub transcription_model: String,
    pub free_message_limit: u32,
    pub db_path: String,
}

impl AppConfig {
    /// Loads configuration from the environment. Missing required values
    /// or a non-numeric free-message limit abort startup; they are never
    /// per-request errors.
    pub fn from_env() -> Result<Self> {
        let openai_api_hostname =
            env::var("EDBOT_API_HOSTNAME").unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_api_key =
            env::var("OPENAI_API_KEY").context("Missing env var OPENAI_API_KEY")?;
        let chat_model =
            env::var("EDBOT_CHAT_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());
        let transcription_model =
            env::var("EDBOT_TRANSCRIPTION_MODEL").unwrap_or_else(|_| "whisper-1".to_string());
        let free_message_limit = env::var("EDBOT_FREE_MESSAGE_LIMIT")
            .context("Missing env var EDBOT_FREE_MESSAGE_LIMIT")?
            .parse::<u32>()
            .context("EDBOT_FREE_MESSAGE_LIMIT must be an integer")?;
        let db_path = env::var("EDBOT_DB_PATH").unwrap_or_else(|_| "./edbot.db".to_string());

        Ok(Self {
            openai_api_hostname,
            openai_api_key,
            chat_model,
            transcription_model,
            free_message_limit,
            db_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn set_required_vars() {
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-test");
            env::set_var("EDBOT_FREE_MESSAGE_LIMIT", "5");
            env::remove_var("EDBOT_API_HOSTNAME");
            env::remove_var("EDBOT_CHAT_MODEL");
            env::remove_var("EDBOT_TRANSCRIPTION_MODEL");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        set_required_vars();
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.free_message_limit, 5);
        assert_eq!(config.chat_model, "gpt-3.5-turbo");
        assert_eq!(config.transcription_model, "whisper-1");
        assert_eq!(config.openai_api_hostname, "https://api.openai.com");
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_non_numeric_limit() {
        set_required_vars();
        unsafe {
            env::set_var("EDBOT_FREE_MESSAGE_LIMIT", "five");
        }
        let result = AppConfig::from_env();
        assert!(result.is_err());
        unsafe {
            env::set_var("EDBOT_FREE_MESSAGE_LIMIT", "5");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_platform_key() {
        set_required_vars();
        unsafe {
            env::remove_var("OPENAI_API_KEY");
        }
        let result = AppConfig::from_env();
        assert!(result.is_err());
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-test");
        }
    }
}
