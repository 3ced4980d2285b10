//! Model-backed helpers: repairing malformed documents and generating samples.
//!
//! The helpers only build prompts and clean up replies. Transport sits behind
//! [`TextGenerator`], which [`AssistClient`] implements over HTTP.
//!
//! ```
//! use devkit_core::assist::{fix_xml, TextGenerator};
//! use devkit_core::AssistError;
//!
//! struct Canned;
//!
//! impl TextGenerator for Canned {
//!     fn generate(&self, _prompt: &str, _system: Option<&str>) -> Result<String, AssistError> {
//!         Ok("```xml\n<a>1</a>\n```".to_owned())
//!     }
//! }
//!
//! assert_eq!(fix_xml(&Canned, "<a>1")?, "<a>1</a>");
//! # Ok::<(), AssistError>(())
//! ```

mod client;
mod config;

pub use client::AssistClient;
pub use config::{
    normalize_url, AssistConfig, Provider, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL,
};

use tracing::debug;

use crate::AssistError;

/// Anything that can turn a prompt into text.
pub trait TextGenerator {
    /// Returns the raw reply for `prompt`, optionally steered by a system instruction.
    fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AssistError>;
}

/// Document kind requested from [`generate_sample`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleKind {
    /// An XML document.
    Xml,
    /// A JSON document.
    Json,
}

impl SampleKind {
    fn label(self) -> &'static str {
        match self {
            Self::Xml => "XML",
            Self::Json => "JSON",
        }
    }
}

/// Asks the backend to repair malformed XML.
pub fn fix_xml<G>(generator: &G, input: &str) -> Result<String, AssistError>
where
    G: TextGenerator + ?Sized,
{
    repair(generator, input, "XML", "You are an XML repair tool. Output only raw XML.")
}

/// Asks the backend to repair malformed JSON.
pub fn fix_json<G>(generator: &G, input: &str) -> Result<String, AssistError>
where
    G: TextGenerator + ?Sized,
{
    repair(generator, input, "JSON", "You are a JSON repair tool. Output only raw JSON.")
}

fn repair<G>(generator: &G, input: &str, label: &str, system: &str) -> Result<String, AssistError>
where
    G: TextGenerator + ?Sized,
{
    let prompt = format!(
        "Fix the following malformed {label} and return ONLY the valid {label} string. \
         Do not add markdown formatting or backticks. Input: {input}"
    );
    debug!(kind = label, bytes = input.len(), "requesting repair");
    let reply = generator.generate(&prompt, Some(system))?;
    Ok(strip_code_fences(&reply))
}

/// Asks the backend for an example document described by `context`.
pub fn generate_sample<G>(
    generator: &G,
    kind: SampleKind,
    context: &str,
) -> Result<String, AssistError>
where
    G: TextGenerator + ?Sized,
{
    let label = kind.label();
    let prompt = format!(
        "Generate a sample {label} object for: \"{context}\". \
         Return ONLY the raw code, no markdown."
    );
    let system = format!("You are a data generator. Output only raw {label}.");
    let reply = generator.generate(&prompt, Some(&system))?;
    Ok(strip_code_fences(&reply))
}

/// Removes Markdown code fences (with an optional language tag) and trims the result.
///
/// ```
/// use devkit_core::assist::strip_code_fences;
/// assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
/// assert_eq!(strip_code_fences("  <a/>  "), "<a/>");
/// ```
#[must_use]
pub fn strip_code_fences(reply: &str) -> String {
    let mut cleaned = String::with_capacity(reply.len());
    let mut rest = reply;
    while let Some(start) = rest.find("```") {
        cleaned.push_str(&rest[..start]);
        let after = &rest[start + 3..];
        let tag_len = after
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        rest = &after[tag_len..];
        rest = rest.strip_prefix('\n').unwrap_or(rest);
    }
    cleaned.push_str(rest);
    cleaned.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        reply: String,
        seen: RefCell<Vec<(String, Option<String>)>>,
    }

    impl TextGenerator for Recorder {
        fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AssistError> {
            self.seen.borrow_mut().push((prompt.to_owned(), system.map(str::to_owned)));
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn repair_prompt_embeds_the_input() {
        let recorder = Recorder { reply: "{\"a\":1}".into(), ..Recorder::default() };
        assert_eq!(fix_json(&recorder, "{a:1}").unwrap(), "{\"a\":1}");

        let seen = recorder.seen.borrow();
        let (prompt, system) = &seen[0];
        assert!(prompt.starts_with("Fix the following malformed JSON"));
        assert!(prompt.ends_with("Input: {a:1}"));
        assert_eq!(system.as_deref(), Some("You are a JSON repair tool. Output only raw JSON."));
    }

    #[test]
    fn sample_prompt_names_the_kind() {
        let recorder = Recorder { reply: "```xml\n<book/>\n```".into(), ..Recorder::default() };
        let sample = generate_sample(&recorder, SampleKind::Xml, "a library book").unwrap();
        assert_eq!(sample, "<book/>");

        let seen = recorder.seen.borrow();
        assert_eq!(
            seen[0].0,
            "Generate a sample XML object for: \"a library book\". Return ONLY the raw code, no markdown."
        );
        assert_eq!(seen[0].1.as_deref(), Some("You are a data generator. Output only raw XML."));
    }

    #[test]
    fn fences_inside_text_are_removed() {
        assert_eq!(strip_code_fences("Here:\n```\n<a/>\n```\nDone"), "Here:\n<a/>\nDone");
        assert_eq!(strip_code_fences("```"), "");
    }

    #[test]
    fn generator_errors_propagate() {
        struct Failing;
        impl TextGenerator for Failing {
            fn generate(&self, _: &str, _: Option<&str>) -> Result<String, AssistError> {
                Err(AssistError::EmptyResponse)
            }
        }
        assert!(matches!(fix_xml(&Failing, "<a>"), Err(AssistError::EmptyResponse)));
    }
}
