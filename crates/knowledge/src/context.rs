//! Token-budgeted context assembly.
//!
//! Ranked passages are concatenated in order, each trimmed and followed by
//! [`CONTEXT_SEPARATOR`]. Assembly stops at the first passage that brings the
//! running token total to or past the budget; that passage is excluded.

use crate::types::PageSection;
use docsearch_core::config::TokenizerEncoding;
use docsearch_core::{AppError, AppResult};

/// Line appended after every included passage.
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Deterministic token counting.
pub trait TokenCounter: Send + Sync {
    /// Count the tokens in `text`.
    fn count(&self, text: &str) -> usize;
}

/// Token counter using tiktoken-rs BPE vocabularies.
pub struct BpeTokenCounter {
    bpe: tiktoken_rs::CoreBPE,
    encoding: TokenizerEncoding,
}

impl BpeTokenCounter {
    /// Load the vocabulary for `encoding`.
    pub fn new(encoding: TokenizerEncoding) -> AppResult<Self> {
        let bpe = match encoding {
            TokenizerEncoding::R50kBase => tiktoken_rs::r50k_base(),
            TokenizerEncoding::P50kBase => tiktoken_rs::p50k_base(),
            TokenizerEncoding::Cl100kBase => tiktoken_rs::cl100k_base(),
        }
        .map_err(|e| AppError::Config(format!("Failed to load tokenizer {:?}: {}", encoding, e)))?;

        Ok(Self { bpe, encoding })
    }

    pub fn encoding(&self) -> TokenizerEncoding {
        self.encoding
    }
}

impl TokenCounter for BpeTokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// Assemble the context block from ranked sections.
///
/// Tokens are counted on each section's raw content. Returns the block and
/// the number of sections it holds.
pub fn assemble_context(
    sections: &[PageSection],
    token_budget: usize,
    counter: &dyn TokenCounter,
) -> (String, usize) {
    let mut context = String::new();
    let mut total_tokens = 0usize;
    let mut included = 0usize;

    for section in sections {
        total_tokens += counter.count(&section.content);

        if total_tokens >= token_budget {
            tracing::debug!(
                "Token budget {} reached after {} of {} sections",
                token_budget,
                included,
                sections.len()
            );
            break;
        }

        context.push_str(section.content.trim());
        context.push_str(CONTEXT_SEPARATOR);
        included += 1;
    }

    (context, included)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts whitespace-separated words.
    struct WordCounter;

    impl TokenCounter for WordCounter {
        fn count(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    fn words(n: usize) -> String {
        vec!["tok"; n].join(" ")
    }

    fn sections(sizes: &[usize]) -> Vec<PageSection> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, n)| PageSection::new(words(*n), 1.0 - i as f32 * 0.01))
            .collect()
    }

    #[test]
    fn test_all_sections_fit() {
        let input = vec![
            PageSection::new("  Shader Graph builds shaders visually.  ", 0.93),
            PageSection::new("Nodes connect inputs to outputs.\n", 0.88),
            PageSection::new("\nMaster nodes define the surface.", 0.80),
        ];

        let (context, included) = assemble_context(&input, 1500, &WordCounter);

        assert_eq!(included, 3);
        assert_eq!(
            context,
            "Shader Graph builds shaders visually.\n---\n\
             Nodes connect inputs to outputs.\n---\n\
             Master nodes define the surface.\n---\n"
        );
    }

    #[test]
    fn test_stops_at_first_overflow() {
        // 4 + 4 = 8 < 10, then 8 + 3 = 11 >= 10
        let (context, included) = assemble_context(&sections(&[4, 4, 3, 1]), 10, &WordCounter);
        assert_eq!(included, 2);
        assert_eq!(context.matches(CONTEXT_SEPARATOR).count(), 2);
    }

    #[test]
    fn test_reaching_budget_exactly_excludes_section() {
        let (_, included) = assemble_context(&sections(&[5, 5]), 10, &WordCounter);
        assert_eq!(included, 1);
    }

    #[test]
    fn test_later_small_sections_not_considered() {
        // The 1-token section after the overflow would fit but must not appear
        let input = vec![
            PageSection::new(words(6), 0.9),
            PageSection::new(words(6), 0.8),
            PageSection::new("tail", 0.7),
        ];
        let (context, included) = assemble_context(&input, 10, &WordCounter);
        assert_eq!(included, 1);
        assert!(!context.contains("tail"));
    }

    #[test]
    fn test_first_section_over_budget_yields_empty() {
        let (context, included) = assemble_context(&sections(&[20, 1]), 10, &WordCounter);
        assert_eq!(included, 0);
        assert!(context.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let (context, included) = assemble_context(&[], 1500, &WordCounter);
        assert_eq!(included, 0);
        assert_eq!(context, "");
    }

    #[test]
    fn test_maximal_prefix_property() {
        let sizes = [3, 7, 2, 9, 1, 4, 6];
        let input = sections(&sizes);

        for budget in 1..40 {
            let (context, included) = assemble_context(&input, budget, &WordCounter);

            let mut sum = 0;
            let mut expected = 0;
            for size in sizes {
                sum += size;
                if sum >= budget {
                    break;
                }
                expected += 1;
            }

            assert_eq!(included, expected, "budget {}", budget);
            let rebuilt: String = input[..expected]
                .iter()
                .map(|s| format!("{}{}", s.content.trim(), CONTEXT_SEPARATOR))
                .collect();
            assert_eq!(context, rebuilt);
        }
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let input = sections(&[3, 3, 3, 3]);
        let first = assemble_context(&input, 10, &WordCounter);
        let second = assemble_context(&input, 10, &WordCounter);
        assert_eq!(first, second);
    }

    #[test]
    fn test_bpe_counter_counts_tokens() {
        let counter = BpeTokenCounter::new(TokenizerEncoding::R50kBase).unwrap();
        assert_eq!(counter.encoding(), TokenizerEncoding::R50kBase);
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("hello world"), 2);
        assert!(counter.count("Shader Graph lets you build shaders visually.") > 5);
    }

    #[test]
    fn test_bpe_counter_other_encodings_load() {
        assert!(BpeTokenCounter::new(TokenizerEncoding::P50kBase).is_ok());
        assert!(BpeTokenCounter::new(TokenizerEncoding::Cl100kBase).is_ok());
    }
}
