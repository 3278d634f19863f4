//! Doctor command - verify tools, API keys and the corpus.

use crate::cli::preflight::check_tool;
use crate::cli::Output;
use crate::config::{GenerationProvider, Settings};
use crate::generation::GEMINI_API_KEY_ENV;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_group(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("DataCommit Doctor");
    println!();

    let tools: Vec<CheckResult> = [
        ("yt-dlp", install_hint_ytdlp()),
        ("ffmpeg", install_hint_ffmpeg()),
        ("ffprobe", install_hint_ffmpeg()),
    ]
    .into_iter()
    .map(|(name, hint)| match check_tool(name) {
        Ok(version) => CheckResult::ok(name, &truncate(&version, 50)),
        // only the preprocessing commands need these
        Err(e) => CheckResult::warning(name, &e.to_string(), hint),
    })
    .collect();
    print_group("External Tools", &tools);

    let keys = vec![
        check_key("OPENAI_API_KEY", true),
        check_key(
            GEMINI_API_KEY_ENV,
            settings.rag.provider == GenerationProvider::Gemini,
        ),
    ];
    print_group("API Keys", &keys);

    let corpus = check_transcripts(settings);
    print_group("Corpus", &corpus);

    let mut checks = tools;
    checks.extend(keys);
    checks.extend(corpus);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!("{} error(s) found.", errors));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed!");
    }

    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

/// A set key is shown masked; a missing key is an error only when `required`.
fn check_key(var: &str, required: bool) -> CheckResult {
    match std::env::var(var) {
        Ok(key) if key.chars().count() > 12 => {
            let head: String = key.chars().take(4).collect();
            let tail: String = key.chars().skip(key.chars().count() - 4).collect();
            CheckResult::ok(var, &format!("configured ({}...{})", head, tail))
        }
        Ok(key) if !key.is_empty() => CheckResult::warning(var, "set but unusually short", "Check the value in your .env file"),
        _ if required => CheckResult::error(var, "not set", &format!("Add {}=... to .env or the environment", var)),
        _ => CheckResult::warning(var, "not set", "Only needed when this provider is selected"),
    }
}

/// Configured transcript files and the database.
fn check_transcripts(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let dir = settings.transcripts_dir();
    let missing: Vec<u32> = settings
        .corpus
        .episodes
        .iter()
        .filter(|e| !dir.join(&e.file).exists())
        .map(|e| e.episode)
        .collect();
    let total = settings.corpus.episodes.len();

    if missing.is_empty() {
        results.push(CheckResult::ok(
            "Transcripts",
            &format!("{} of {} found in {}", total, total, dir.display()),
        ));
    } else if missing.len() < total {
        results.push(CheckResult::warning(
            "Transcripts",
            &format!("missing episodes {:?} in {}", missing, dir.display()),
            "Missing episodes are skipped during ingestion",
        ));
    } else {
        results.push(CheckResult::error(
            "Transcripts",
            &format!("none found in {}", dir.display()),
            "Set corpus.transcripts_dir in the config file",
        ));
    }

    let db_path = settings.sqlite_path();
    if db_path.exists() {
        let size = std::fs::metadata(&db_path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        results.push(CheckResult::ok(
            "Database",
            &format!("{} ({})", db_path.display(), size),
        ));
    } else {
        results.push(CheckResult::warning(
            "Database",
            &format!("{} (not created yet)", db_path.display()),
            "Run: datacommit ingest",
        ));
    }

    results
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else {
        "Install with: pip install yt-dlp (or your package manager)"
    }
}

fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_key_is_warning() {
        let result = check_key("DATACOMMIT_TEST_UNSET_KEY", false);
        assert_eq!(result.status, CheckStatus::Warning);

        let result = check_key("DATACOMMIT_TEST_UNSET_KEY", true);
        assert_eq!(result.status, CheckStatus::Error);
    }

    #[test]
    fn test_transcripts_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.corpus.transcripts_dir = dir.path().display().to_string();
        settings.vector_store.sqlite_path = dir.path().join("vectors.db").display().to_string();

        let results = check_transcripts(&settings);
        assert_eq!(results[0].status, CheckStatus::Error);
        assert_eq!(results[1].status, CheckStatus::Warning);

        std::fs::write(dir.path().join(&settings.corpus.episodes[0].file), "x").unwrap();
        let results = check_transcripts(&settings);
        assert_eq!(results[0].status, CheckStatus::Warning);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }
}
