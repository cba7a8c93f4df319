//! Prompt builder: renders the answer template around the context block.

use crate::types::{PromptInput, ANSWER_TEMPLATE};
use docsearch_core::{AppError, AppResult};
use handlebars::Handlebars;

const TEMPLATE_NAME: &str = "answer";

/// Compiled answer template.
///
/// Built once at startup and shared read-only between requests.
pub struct PromptBuilder {
    registry: Handlebars<'static>,
}

impl PromptBuilder {
    /// Compile the built-in answer template.
    pub fn new() -> AppResult<Self> {
        Self::with_template(ANSWER_TEMPLATE)
    }

    /// Compile a custom template using the `context` and `question` variables.
    pub fn with_template(template: &str) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Plain text output, no HTML escaping
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        Ok(Self { registry })
    }

    /// Render the prompt for one question.
    ///
    /// Pure: the same context and question always render the same text.
    ///
    /// # Example
    /// ```
    /// use docsearch_prompt::PromptBuilder;
    ///
    /// let builder = PromptBuilder::new().unwrap();
    /// let prompt = builder.build("Shaders run on the GPU.\n---\n", "What is a shader?").unwrap();
    /// assert!(prompt.contains("What is a shader?"));
    /// ```
    pub fn build(&self, context: &str, question: &str) -> AppResult<String> {
        let rendered = self
            .registry
            .render(TEMPLATE_NAME, &PromptInput { context, question })
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

        tracing::debug!(
            "Built prompt ({} bytes, {} bytes of context)",
            rendered.len(),
            context.len()
        );

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_prompt(context: &str, question: &str) -> AppResult<String> {
        PromptBuilder::new()?.build(context, question)
    }

    #[test]
    fn test_prompt_layout() {
        let context = "First section.\n---\nSecond section.\n---\n";
        let prompt = build_prompt(context, "What is a Shader Graph?").unwrap();

        assert!(prompt.starts_with("You are a very enthusiastic documentation assistant"));
        assert!(prompt.contains("Sorry, I don't know how to help with that."));
        assert!(prompt.contains(&format!("Context sections:\n{}\n", context)));
        assert!(prompt.contains("Question: \"\"\"\nWhat is a Shader Graph?\n\"\"\""));
        assert!(prompt
            .trim_end()
            .ends_with("Answer as markdown (including related code snippets if available):"));
    }

    #[test]
    fn test_context_precedes_question() {
        let prompt = build_prompt("CONTEXT_MARKER\n---\n", "QUESTION_MARKER").unwrap();
        let context_at = prompt.find("CONTEXT_MARKER").unwrap();
        let question_at = prompt.find("QUESTION_MARKER").unwrap();
        assert!(context_at < question_at);
    }

    #[test]
    fn test_no_html_escaping() {
        let prompt = build_prompt("<Shader> & \"graph\"", "a < b && c").unwrap();
        assert!(prompt.contains("<Shader> & \"graph\""));
        assert!(prompt.contains("a < b && c"));
    }

    #[test]
    fn test_template_syntax_in_question_is_not_evaluated() {
        let prompt = build_prompt("", "what does {{context}} do?").unwrap();
        assert!(prompt.contains("what does {{context}} do?"));
    }

    #[test]
    fn test_empty_context_still_renders() {
        let prompt = build_prompt("", "Anything?").unwrap();
        assert!(prompt.contains("Context sections:\n\n"));
        assert!(prompt.contains("Anything?"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::new().unwrap();
        let a = builder.build("ctx\n---\n", "q").unwrap();
        let b = builder.build("ctx\n---\n", "q").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_custom_template() {
        assert!(PromptBuilder::with_template("{{#if}}").is_err());
    }
}
