/*!
 * Prompt templates for content analysis and per-line translation.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::translation::window::ContextWindow;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Summary used when analysis is skipped or fails
pub const DEFAULT_CONTEXT_SUMMARY: &str =
    "This is a subtitle file to translate. Preserve the tone and style of the original.";

/// System prompt for the one-off content analysis
pub const ANALYSIS_TEMPLATE: &str = r#"You are a professional subtitle analyst. Analyze the overall content of the subtitle text below and write a detailed, precise report that will guide a later translation into {target_language}:

1. Content type (e.g. TV series, documentary, interview, educational video)
2. Main theme and core plot
3. Key people or characters and their traits
4. Specific places or settings, with fixed translations (list the original and the {target_language} translation)
5. Proper nouns to translate consistently (list the original and the {target_language} translation)
6. Language style and tone
7. Likely target audience
{vocabulary_section}
Summarize this information in concise, professional language.

Text (first {excerpt_limit} characters):
{excerpt}"#;

/// System prompt for translating one line with its surrounding context
pub const LINE_TEMPLATE: &str = r#"You are a professional subtitle translator translating into {target_language}. Background information about this content:

{context_summary}

Custom vocabulary (pay special attention when translating):
{vocabulary}

Translation requirements:
1. Translate ONLY the "Text to translate" section
2. Keep the tone and style of the original
3. Make the translation natural and fluent
4. Return only the translation, with nothing else added
5. The surrounding lines are context only; do not translate or repeat them
6. Only the first line of your reply is used

Previous lines (up to 10, translated where available):
{preceding}

Text to translate: {text}

Following lines (up to 10, untranslated):
{following}

Return only the translation of the text to translate."#;

/// Render the analysis system prompt
pub fn analysis_prompt(excerpt: &str, target_language: &str, vocabulary: &[String], excerpt_limit: usize) -> String {
    let vocabulary_section = if vocabulary.is_empty() {
        String::new()
    } else {
        format!("\nCustom vocabulary list:\n{}\n", vocabulary.join("\n"))
    };

    let excerpt_limit = excerpt_limit.to_string();
    render(ANALYSIS_TEMPLATE, |name| match name {
        "target_language" => Some(target_language),
        "vocabulary_section" => Some(vocabulary_section.as_str()),
        "excerpt_limit" => Some(excerpt_limit.as_str()),
        "excerpt" => Some(excerpt),
        _ => None,
    })
}

/// Render the per-line system prompt
pub fn line_prompt(
    text: &str,
    window: &ContextWindow,
    context_summary: &str,
    target_language: &str,
    vocabulary: &[String],
) -> String {
    let vocabulary = if vocabulary.is_empty() {
        "None".to_string()
    } else {
        vocabulary.join("\n")
    };

    let preceding = window.preceding.join("\n");
    let following = window.following.join("\n");
    render(LINE_TEMPLATE, |name| match name {
        "target_language" => Some(target_language),
        "context_summary" => Some(context_summary),
        "vocabulary" => Some(vocabulary.as_str()),
        "preceding" => Some(preceding.as_str()),
        "following" => Some(following.as_str()),
        "text" => Some(text),
        _ => None,
    })
}

/// Fill every `{name}` in a single pass; inserted values are never rescanned
fn render<'a, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match lookup(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
