//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and API keys are available before starting
//! work that would otherwise fail midway.

use crate::config::{GenerationProvider, Settings};
use crate::error::{DataCommitError, Result};
use crate::generation::GEMINI_API_KEY_ENV;
use std::process::Command;

const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Answering questions embeds with OpenAI and generates with the configured provider.
    Query,
    /// Ingestion only embeds.
    Ingest,
    Download,
    Transcribe,
    /// Cleaning generates with the cleanup provider.
    Clean,
    /// Renaming and status work on local files only.
    Local,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Query => {
            check_api_key(OPENAI_KEY_ENV)?;
            check_provider_key(settings.rag.provider)?;
        }
        Operation::Ingest => {
            check_api_key(OPENAI_KEY_ENV)?;
        }
        Operation::Download => {
            check_tool("yt-dlp")?;
        }
        Operation::Transcribe => {
            check_api_key(OPENAI_KEY_ENV)?;
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
        }
        Operation::Clean => {
            check_provider_key(settings.cleanup.provider)?;
        }
        Operation::Local => {}
    }
    Ok(())
}

fn check_provider_key(provider: GenerationProvider) -> Result<()> {
    match provider {
        GenerationProvider::Gemini => check_api_key(GEMINI_API_KEY_ENV),
        GenerationProvider::OpenAI => check_api_key(OPENAI_KEY_ENV),
    }
}

/// Check that an API key variable is set and non-empty.
pub fn check_api_key(var: &str) -> Result<()> {
    match std::env::var(var) {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(DataCommitError::Config(format!(
            "{var} is empty. Set it in the environment or in a .env file."
        ))),
        Err(_) => Err(DataCommitError::Config(format!(
            "{var} not set. Set it in the environment or in a .env file."
        ))),
    }
}

/// Check if an external tool is available, returning the first line of its version output.
pub fn check_tool(name: &str) -> Result<String> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("installed")
            .trim()
            .to_string()),
        Ok(_) => Err(DataCommitError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(DataCommitError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(DataCommitError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_operations_have_no_requirements() {
        assert!(check(Operation::Local, &Settings::default()).is_ok());
    }

    #[test]
    fn test_missing_tool() {
        let result = check_tool("datacommit-no-such-tool");
        assert!(matches!(result, Err(DataCommitError::ToolNotFound(_))));
    }

    #[test]
    fn test_missing_key() {
        let result = check_api_key("DATACOMMIT_TEST_UNSET_KEY");
        assert!(matches!(result, Err(DataCommitError::Config(msg)) if msg.contains("not set")));
    }
}
