use super::llm::LlmClient;
use super::prompt::explanation_prompt;

/// Placeholder shown when the explanation could not be generated.
pub const RESPONSE_FAILED: &str = "Error generating response. Please try again.";

/// Result of asking for an explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Generated(String),
    Unavailable,
}

impl Answer {
    /// Display text: the explanation, or the fixed placeholder.
    pub fn text(&self) -> &str {
        match self {
            Answer::Generated(text) => text,
            Answer::Unavailable => RESPONSE_FAILED,
        }
    }
}

/// Requests the structured three-section explanation.
pub struct Responder<'a> {
    llm: &'a dyn LlmClient,
    model: &'a str,
}

impl<'a> Responder<'a> {
    pub fn new(llm: &'a dyn LlmClient, model: &'a str) -> Self {
        Self { llm, model }
    }

    pub fn respond(&self, query: &str) -> Answer {
        match self.llm.complete(&explanation_prompt(query), self.model) {
            Ok(reply) => {
                let text = reply.trim().to_string();
                tracing::info!(query_len = query.len(), answer_len = text.len(), "Explanation generated");
                Answer::Generated(text)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error generating explanation");
                Answer::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tutor::llm::MockLlmClient;

    #[test]
    fn reply_is_trimmed() {
        let llm = MockLlmClient::new("\n  1. **Complete Theory Description:** ...  \n");
        let answer = Responder::new(&llm, "m").respond("Markov Chain");
        assert_eq!(
            answer,
            Answer::Generated("1. **Complete Theory Description:** ...".into())
        );
    }

    #[test]
    fn failure_yields_placeholder() {
        let llm = MockLlmClient::failing("503");
        let answer = Responder::new(&llm, "m").respond("Markov Chain");
        assert_eq!(answer, Answer::Unavailable);
        assert_eq!(answer.text(), "Error generating response. Please try again.");
    }

    #[test]
    fn prompt_asks_for_the_query_topic() {
        let llm = MockLlmClient::new("ok");
        Responder::new(&llm, "m").respond("Gradient Descent");
        assert!(llm.prompts()[0].starts_with("Explain the topic 'Gradient Descent'"));
    }
}
