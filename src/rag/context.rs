//! Prompt assembly and source attribution for RAG responses.

use super::SourceAttribution;
use crate::config::Prompts;
use crate::vector_store::{Chunk, SearchResult};
use std::collections::{HashMap, HashSet};

/// Render every retrieved chunk with the chunk template.
pub fn format_context_for_prompt<'a, I>(prompts: &Prompts, chunks: I) -> String
where
    I: IntoIterator<Item = &'a Chunk>,
{
    chunks
        .into_iter()
        .map(|chunk| {
            let mut vars = HashMap::new();
            vars.insert("episode".to_string(), chunk.episode.to_string());
            vars.insert("guest".to_string(), chunk.guest.clone());
            vars.insert("content".to_string(), chunk.content.clone());
            Prompts::render(&prompts.rag.chunk, &vars)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the full answer prompt for `question` from the retrieved results.
///
/// Every result is included regardless of its score.
pub fn build_prompt(prompts: &Prompts, results: &[SearchResult], question: &str) -> String {
    let context = format_context_for_prompt(prompts, results.iter().map(|r| &r.chunk));

    let mut vars = HashMap::new();
    vars.insert("context".to_string(), context);
    vars.insert("question".to_string(), question.to_string());

    prompts.render_with_custom(&prompts.rag.template, &vars)
}

/// One attribution per (episode, guest), in rank order.
///
/// The first occurrence wins, so each attribution carries the best score
/// for its episode.
pub fn dedupe_sources(results: &[SearchResult]) -> Vec<SourceAttribution> {
    let mut seen: HashSet<(u32, &str)> = HashSet::new();

    results
        .iter()
        .filter(|r| seen.insert((r.chunk.episode, r.chunk.guest.as_str())))
        .map(|r| SourceAttribution {
            episode: r.chunk.episode,
            guest: r.chunk.guest.clone(),
            score: r.score,
        })
        .collect()
}

/// First `max_chars` characters of `content`, with an ellipsis when cut.
pub fn preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let mut cut: String = content.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(episode: u32, guest: &str, content: &str, score: f32) -> SearchResult {
        SearchResult {
            chunk: Chunk::new(episode, guest.into(), content.into(), 0, 0, "f.txt".into()),
            score,
        }
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let results = vec![
            result(3, "Alara Dirik", "a", 0.9),
            result(1, "Kaan Bıçakçı", "b", 0.8),
            result(3, "Alara Dirik", "c", 0.7),
            result(5, "Eren Akbaba", "d", 0.6),
            result(1, "Kaan Bıçakçı", "e", 0.5),
        ];

        let sources = dedupe_sources(&results);
        let episodes: Vec<u32> = sources.iter().map(|s| s.episode).collect();
        assert_eq!(episodes, vec![3, 1, 5]);
        assert!((sources[0].score - 0.9).abs() < f32::EPSILON);
        assert!((sources[1].score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_dedupe_empty() {
        assert!(dedupe_sources(&[]).is_empty());
    }

    #[test]
    fn test_prompt_contains_every_chunk() {
        let prompts = Prompts::default();
        let results = vec![
            result(2, "Bilge Yücel", "açık kaynak katkısı", 0.1),
            result(7, "Murat Şahin", "mülakat hazırlığı", 0.05),
        ];

        let prompt = build_prompt(&prompts, &results, "Jr lar nasıl iş bulur?");

        assert!(prompt.contains("[Bölüm 2 - Konuk: Bilge Yücel]\naçık kaynak katkısı\n---"));
        assert!(prompt.contains("[Bölüm 7 - Konuk: Murat Şahin]\nmülakat hazırlığı"));
        assert!(prompt.contains("Soru: Jr lar nasıl iş bulur?"));
        assert!(prompt.trim_end().ends_with("Cevap:"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_placeholders_in_user_text_are_kept_verbatim() {
        let mut prompts = Prompts::default();
        prompts.rag.template = "Context:\n{{context}}\n\nSoru: {{question}}\nCevap:".to_string();
        let results = vec![result(1, "Kaan Bıçakçı", "içerik {{guest}}", 0.4)];

        let prompt = build_prompt(&prompts, &results, "Soru {{context}}?");

        assert_eq!(
            prompt,
            "Context:\n---\n[Bölüm 1 - Konuk: Kaan Bıçakçı]\niçerik {{guest}}\n---\n\nSoru: Soru {{context}}?\nCevap:"
        );
    }

    #[test]
    fn test_preview_is_char_safe() {
        assert_eq!(preview("kısa", 400), "kısa");
        assert_eq!(preview("çğüşöı", 3), "çğü...");
    }
}
