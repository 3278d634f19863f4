//! CLI output formatting utilities.

use crate::rag::preview;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

const RULE_WIDTH: usize = 80;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a section marker such as `--- CEVAP ---`.
    pub fn section(title: &str) {
        println!("\n{}", style(format!("--- {} ---", title)).bold());
    }

    /// Print a full-width rule.
    pub fn rule(ch: char) {
        println!("{}", ch.to_string().repeat(RULE_WIDTH));
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("•").cyan(), msg);
    }

    /// Print a cited episode.
    pub fn source(episode: u32, guest: &str, score: f32) {
        println!(
            "  {} Bölüm {}: {} {}",
            style("•").cyan(),
            episode,
            style(guest).bold(),
            style(format!("(relevance: {:.4})", score)).dim()
        );
    }

    /// Print a retrieved chunk with its first 400 characters.
    pub fn chunk(index: usize, episode: u32, guest: &str, score: f32, content: &str) {
        println!(
            "\n{} Bölüm {} - {} | Score: {:.4}",
            style(format!("[Chunk {}]", index)).cyan().bold(),
            episode,
            guest,
            score
        );
        println!("{}", "-".repeat(RULE_WIDTH / 2));
        println!("{}", preview(content, 400));
        Self::rule('=');
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        if let Ok(bar) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar.progress_chars("#>-"));
        }
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Format duration in seconds to a human-readable string.
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42.9), "42s");
        assert_eq!(format_duration(125.0), "2m 5s");
        assert_eq!(format_duration(3723.0), "1h 2m 3s");
    }
}
