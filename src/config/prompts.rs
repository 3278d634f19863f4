//! Prompt templates for DataCommit.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid placeholder pattern"))
}

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    /// Prompts for LLM transcript cleaning.
    pub cleanup: CleanupPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// Full prompt. `{{context}}` receives the rendered chunks, `{{question}}` the user question.
    pub template: String,
    /// Rendering of a single retrieved chunk inside `{{context}}`.
    pub chunk: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            template: r#"
Sen DataCommit podcast serisinin içeriklerinden sorulara cevap veren bir asistansın.

DataCommit, veri bilimi alanında deneyimli uzmanların kariyer yolculuklarını ve teknik bilgilerini paylaştığı bir platformdur.

Aşağıdaki bölümlerden gelen bilgilere dayanarak soruyu cevapla.

Context:
{{context}}

Soru: {{question}}

Cevabını verirken:
1. İlgili bilgileri sentezle
2. Her önemli bilgi için kaynak göster: (Bölüm X, Konuk adı)
3. Birden fazla bölümden bilgi varsa hepsini belirt

Cevap:
"#
            .to_string(),

            chunk: "---\n[Bölüm {{episode}} - Konuk: {{guest}}]\n{{content}}\n---".to_string(),
        }
    }
}

/// Prompts for LLM transcript cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupPrompts {
    pub system: String,
    /// Extra instruction appended to the first chunk of a transcript.
    pub first_chunk: String,
    /// Request body. Receives `{{system}}`, `{{previous_context}}`, `{{chunk}}`
    /// and `{{first_chunk_instruction}}`.
    pub user: String,
}

impl Default for CleanupPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert Turkish transcript editor specializing in conversation analysis and correction.

TASK: Clean and correct Turkish conversation transcripts by analyzing semantic flow, speaker patterns, and linguistic context.

CORRECTIONS REQUIRED:

1. SPEAKER LABEL ANALYSIS & CORRECTION:
   - DO NOT trust the original speaker labels - they may be completely wrong
   - Re-analyze the entire conversation from scratch to determine who is actually speaking
   - Identify speech patterns: Who is hosting/introducing? Who is responding? Who asks questions?
   - If a speaker is mid-sentence or mid-thought, merge with their previous speech
   - Look for natural turn-taking: questions → answers, statements → responses
   - A single speaker can speak for many consecutive sentences/paragraphs
   - Only switch speakers when there's genuine conversational turn (new person responding, answering, or interjecting)
   - The first speaker label in the original may be wrong - reconsider based on content

2. MERGE FRAGMENTED SPEECH:
   - Combine all consecutive lines belonging to the same speaker into one continuous block under a single [Speaker X]: label
   - Remove unnecessary line breaks within a speaker's turn
   - Keep all text flowing naturally as one speaker's contribution

3. TURKISH LANGUAGE CORRECTIONS:
   - Fix common transcription errors: "düğürlerinizi" → "duyurularınızı", "maltı" → "MultiGroup", "Datacomit" → "DataCommit", "diyelim" (check context)
   - Correct technical terms: "emelops" → "MLOps", "vef" → "web", "trd" → "TR'de"
   - Fix spacing and capitalization: proper nouns, sentence starts
   - Preserve colloquial speech ("ya", "yani", "işte") but fix obvious mistakes
   - Correct misheard words based on semantic context

4. PUNCTUATION:
   - Add proper Turkish punctuation (periods, commas, question marks, exclamation marks)
   - Use commas for natural pauses in speech
   - End complete thoughts with periods

OUTPUT FORMAT:
- [Speaker X]: followed by all their continuous speech in one paragraph
- Only switch to [Speaker Y]: when the conversation actually changes speakers
- NO explanations, comments, or meta-text
- Clean, readable Turkish conversation format

EXAMPLE 1 - Merging fragments:
WRONG (fragmented, incorrect labels):
[Speaker 2]: merhaba ben bugün sizlere
[Speaker 1]: bir şeyden bahsedeceğim çok önemli
[Speaker 2]: bu konu hakkında

CORRECT (merged, proper label):
[Speaker 1]: Merhaba, ben bugün sizlere bir şeyden bahsedeceğim. Çok önemli bu konu hakkında.

EXAMPLE 2 - Long host introduction:
WRONG (incorrectly split):
[Speaker 2]: Selamlar herkese bugün sizlere bir konudan bahsedeceğim
[Speaker 1]: bu konu çok önemli
[Speaker 2]: şimdi başlayalım

CORRECT (kept together as one speaker):
[Speaker 1]: Selamlar herkese, bugün sizlere bir konudan bahsedeceğim. Bu konu çok önemli. Şimdi başlayalım."#
                .to_string(),

            first_chunk: r#"
SPECIAL INSTRUCTION FOR FIRST CHUNK:
- This is the beginning of the conversation
- Identify who is the MAIN HOST (the person who welcomes everyone, introduces the show/topic)
- Assign the main host as [Speaker 1]:
- Assign other participant(s) as [Speaker 2]:
- IGNORE the original speaker labels completely - reassign based on who is actually speaking
"#
            .to_string(),

            user: r#"{{system}}

Previous context (for continuity):
{{previous_context}}

Current transcript to clean:
{{chunk}}
{{first_chunk_instruction}}

IMPORTANT ANALYSIS STEPS:
1. Read the entire chunk first
2. Identify conversation roles: Who is the main host/introducer? Who are other participants?
3. This is a 2-person conversation - use ONLY [Speaker 1]: and [Speaker 2]: labels
4. Identify natural conversation boundaries:
   - Who is introducing/hosting? (usually continues for several sentences)
   - Who is responding to questions?
   - Where do questions end and answers begin?
   - Does a sentence continue from the previous speaker's thought?
5. Keep related sentences together under one speaker
6. Only switch speakers at genuine conversation turns

Output only the cleaned transcript with [Speaker 1]: and [Speaker 2]: labels."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }

            let cleanup_path = custom_path.join("cleanup.toml");
            if cleanup_path.exists() {
                let content = std::fs::read_to_string(&cleanup_path)?;
                prompts.cleanup = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are expanded in a single pass over `template`, so
    /// substituted values are never expanded again. Unknown placeholders are
    /// left as they are.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        placeholder()
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.rag.template.contains("{{context}}"));
        assert!(prompts.rag.template.contains("{{question}}"));
        assert!(prompts.cleanup.user.contains("{{chunk}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_substituted_values() {
        let mut vars = HashMap::new();
        vars.insert("a".to_string(), "{{b}}".to_string());
        vars.insert("b".to_string(), "{{a}}".to_string());

        for _ in 0..20 {
            assert_eq!(Prompts::render("{{a}}|{{b}}|{{c}}", &vars), "{{b}}|{{a}}|{{c}}");
        }
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("podcast".to_string(), "DataCommit".to_string());
        prompts.variables.insert("question".to_string(), "ignored".to_string());

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Nasıl?".to_string());

        let out = prompts.render_with_custom("{{podcast}}: {{question}}", &vars);
        assert_eq!(out, "DataCommit: Nasıl?");
    }

    #[test]
    fn test_load_custom_rag_prompt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rag.toml"),
            "template = \"Q: {{question}}\\n{{context}}\"\nchunk = \"({{episode}}) {{content}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.rag.template, "Q: {{question}}\n{{context}}");
        assert_eq!(prompts.rag.chunk, "({{episode}}) {{content}}");
        assert!(!prompts.cleanup.system.is_empty());
    }
}
