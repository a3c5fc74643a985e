//! Audio conversion for the voice path. Voice notes arrive in a format
//! the transcription service does not accept, so each clip is piped
//! through ffmpeg once before upload.
use std::env;
use std::process::Stdio;

use anyhow::{Context, Result, anyhow, bail};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Converts an audio clip to `target_format` by piping it through
/// ffmpeg's stdin/stdout. The binary can be overridden with the
/// `EDBOT_FFMPEG_PATH` env var.
pub async fn convert(input: Vec<u8>, target_format: &str) -> Result<Vec<u8>> {
    let binary = env::var("EDBOT_FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string());

    let mut child = Command::new(&binary)
        .args(["-i", "pipe:0", "-f", target_format, "pipe:1"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {}", binary))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or(anyhow!("Failed to open ffmpeg stdin"))?;

    // Feed stdin from a separate task so a large clip can't deadlock
    // against the child filling its stdout pipe. Dropping stdin closes it.
    let writer = tokio::spawn(async move { stdin.write_all(&input).await });

    let output = child
        .wait_with_output()
        .await
        .context("Failed to wait for ffmpeg")?;
    writer
        .await
        .context("ffmpeg stdin writer task failed")?
        .context("Failed to write audio to ffmpeg")?;

    if !output.status.success() {
        bail!(
            "ffmpeg exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    tracing::debug!("Converted {} bytes of audio to {}", output.stdout.len(), target_format);
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn test_convert_missing_binary_is_an_error() {
        unsafe {
            env::set_var("EDBOT_FFMPEG_PATH", "/nonexistent/ffmpeg");
        }

        let result = convert(vec![0u8; 16], "mp3").await;
        assert!(result.is_err());

        unsafe {
            env::remove_var("EDBOT_FFMPEG_PATH");
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_convert_propagates_child_exit_status() {
        // `false` accepts no input and exits non-zero, standing in for a
        // conversion failure without requiring ffmpeg on the test host
        unsafe {
            env::set_var("EDBOT_FFMPEG_PATH", "false");
        }

        let result = convert(Vec::new(), "mp3").await;
        assert!(result.is_err());

        unsafe {
            env::remove_var("EDBOT_FFMPEG_PATH");
        }
    }
}
