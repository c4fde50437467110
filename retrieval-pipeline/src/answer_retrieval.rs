use serde::Serialize;

use crate::scoring::PromptContext;

pub static DEFAULT_SYSTEM_PROMPT: &str = "You are an expert assistant for an airport analytics dashboard. Use the provided context to answer the user's question as accurately as possible. If the context is insufficient, say so politely.";

/// The system/user message pair sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

pub fn create_user_message(question: &str, context: &PromptContext) -> String {
    format!(
        "User question: {question}\n\nRelevant context:\n{}",
        context.to_context_text()
    )
}

pub fn assemble_prompt(
    system_prompt: &str,
    question: &str,
    context: &PromptContext,
) -> ChatPrompt {
    ChatPrompt {
        system: system_prompt.to_owned(),
        user: create_user_message(question, context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{rank_chunks, ChunkScore};

    #[test]
    fn test_empty_context_still_carries_question_and_instruction() {
        let prompt = assemble_prompt(
            DEFAULT_SYSTEM_PROMPT,
            "Why is DEL slower?",
            &PromptContext::default(),
        );

        assert_eq!(prompt.system, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(
            prompt.user,
            "User question: Why is DEL slower?\n\nRelevant context:\n"
        );
    }

    #[test]
    fn test_selected_chunks_are_newline_joined() {
        let context = PromptContext::from(rank_chunks(
            vec![
                ChunkScore {
                    chunk: "DEL averages 18 minutes of delay.",
                    score: 1,
                },
                ChunkScore {
                    chunk: "BLR averages 11 minutes of delay.",
                    score: 2,
                },
            ],
            3,
        ));

        let user = create_user_message("Compare delays", &context);

        assert_eq!(
            user,
            "User question: Compare delays\n\nRelevant context:\n\
             BLR averages 11 minutes of delay.\n\
             DEL averages 18 minutes of delay."
        );
    }

    #[test]
    fn test_default_instruction_mentions_context_and_insufficiency() {
        assert!(DEFAULT_SYSTEM_PROMPT.contains("airport analytics dashboard"));
        assert!(DEFAULT_SYSTEM_PROMPT.contains("provided context"));
        assert!(DEFAULT_SYSTEM_PROMPT.contains("insufficient"));
    }
}
