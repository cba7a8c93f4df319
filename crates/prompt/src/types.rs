//! Prompt types for docsearch.

use serde::Serialize;

/// Instruction template sent to the completion model.
///
/// `context` is inserted as-is; each section in it already ends with its
/// own separator line.
pub const ANSWER_TEMPLATE: &str = r#"You are a very enthusiastic documentation assistant who loves to help people! Given the following sections from the documentation, answer the question using only that information, outputted in markdown format. If you are unsure and the answer is not explicitly written in the documentation, say "Sorry, I don't know how to help with that."

Context sections:
{{context}}

Question: """
{{question}}
"""

Answer as markdown (including related code snippets if available):
"#;

/// Variables available to the template.
#[derive(Debug, Clone, Serialize)]
pub struct PromptInput<'a> {
    /// Assembled context block (may be empty)
    pub context: &'a str,

    /// Sanitized user question
    pub question: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_mentions_both_variables() {
        assert!(ANSWER_TEMPLATE.contains("{{context}}"));
        assert!(ANSWER_TEMPLATE.contains("{{question}}"));
    }

    #[test]
    fn test_prompt_input_serialization() {
        let input = PromptInput {
            context: "ctx",
            question: "q",
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["context"], "ctx");
        assert_eq!(json["question"], "q");
    }
}
