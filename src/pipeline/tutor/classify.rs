use serde::{Deserialize, Serialize};

use super::llm::LlmClient;
use super::prompt::classification_prompt;

/// Rationale shown when the relevance check itself could not run.
pub const CLASSIFICATION_FAILED: &str = "Error determining the relevance of the query.";

/// Outcome of the data-science relevance check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub accepted: bool,
    /// Raw model text, exactly as returned.
    pub rationale: String,
}

impl ClassificationResult {
    /// Accepted when the normalised reply mentions "yes" anywhere.
    pub fn from_reply(reply: String) -> Self {
        let accepted = reply.trim().to_lowercase().contains("yes");
        Self {
            accepted,
            rationale: reply,
        }
    }

    fn failed() -> Self {
        Self {
            accepted: false,
            rationale: CLASSIFICATION_FAILED.to_string(),
        }
    }
}

/// Asks the remote model whether a query belongs to data science.
pub struct DomainClassifier<'a> {
    llm: &'a dyn LlmClient,
    model: &'a str,
}

impl<'a> DomainClassifier<'a> {
    pub fn new(llm: &'a dyn LlmClient, model: &'a str) -> Self {
        Self { llm, model }
    }

    /// Never fails: a remote error reads as "not accepted".
    pub fn classify(&self, query: &str) -> ClassificationResult {
        match self.llm.complete(&classification_prompt(query), self.model) {
            Ok(reply) => {
                let result = ClassificationResult::from_reply(reply);
                tracing::info!(
                    query_len = query.len(),
                    accepted = result.accepted,
                    "Query classified"
                );
                result
            }
            Err(e) => {
                tracing::error!(error = %e, "Error in query classification");
                ClassificationResult::failed()
            }
        }
    }
}
