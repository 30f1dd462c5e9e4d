use serde::Serialize;

use super::classify::{ClassificationResult, DomainClassifier};
use super::history::Session;
use super::llm::LlmClient;
use super::respond::{Answer, Responder};
use crate::pipeline::extraction::{ExtractionWarning, TextExtractor};
use crate::pipeline::import::Artifact;

pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type!";
pub const NO_QUERY_TEXT: &str = "No text to work with. Upload a readable file or enter a topic.";

/// Where a single "generate" run is, or ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    ExtractingText,
    Classifying,
    Rejected,
    Responding,
    Recorded,
    ResponseFailed,
    UnsupportedArtifact,
    EmptyQuery,
}

/// What the user submitted: an upload, a typed topic, or both.
#[derive(Debug, Default)]
pub struct PipelineInput {
    pub topic: Option<String>,
    pub artifact: Option<Artifact>,
}

impl PipelineInput {
    pub fn topic(topic: &str) -> Self {
        Self {
            topic: Some(topic.to_string()),
            artifact: None,
        }
    }

    pub fn artifact(artifact: Artifact) -> Self {
        Self {
            topic: None,
            artifact: Some(artifact),
        }
    }
}

/// Result of one run. `state` is terminal; `visited` lists every state in order.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub state: PipelineState,
    pub visited: Vec<PipelineState>,
    pub query: Option<String>,
    pub classification: Option<ClassificationResult>,
    pub answer: Option<Answer>,
    pub history_index: Option<usize>,
    pub show_image_reference: bool,
    pub extraction_warnings: Vec<ExtractionWarning>,
}

impl PipelineOutcome {
    fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            visited: vec![PipelineState::Idle],
            query: None,
            classification: None,
            answer: None,
            history_index: None,
            show_image_reference: false,
            extraction_warnings: Vec::new(),
        }
    }

    fn enter(&mut self, state: PipelineState) {
        self.state = state;
        self.visited.push(state);
    }

    /// The text shown to the user for this outcome.
    pub fn message(&self) -> String {
        match self.state {
            PipelineState::Rejected => {
                let rationale = self
                    .classification
                    .as_ref()
                    .map(|c| c.rationale.as_str())
                    .unwrap_or_default();
                format!(
                    "Sorry, I can only answer Data Science-related queries. Here's why: {rationale}"
                )
            }
            PipelineState::UnsupportedArtifact => UNSUPPORTED_FILE_TYPE.to_string(),
            PipelineState::EmptyQuery => NO_QUERY_TEXT.to_string(),
            _ => self
                .answer
                .as_ref()
                .map(|a| a.text().to_string())
                .unwrap_or_default(),
        }
    }
}

/// extract → classify → respond → record.
pub struct TutorPipeline {
    extractor: Box<dyn TextExtractor + Send + Sync>,
    llm: Box<dyn LlmClient + Send + Sync>,
    model: String,
}

impl TutorPipeline {
    pub fn new(
        extractor: Box<dyn TextExtractor + Send + Sync>,
        llm: Box<dyn LlmClient + Send + Sync>,
        model: &str,
    ) -> Self {
        Self {
            extractor,
            llm,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Runs one "generate" against `session`. History grows only on `Recorded`.
    pub fn run(&self, session: &mut Session, input: &PipelineInput) -> PipelineOutcome {
        let mut outcome = PipelineOutcome::new();
        let mut from_image = false;
        let mut query: Option<String> = None;

        if let Some(artifact) = &input.artifact {
            if !artifact.kind.is_supported() {
                tracing::warn!(
                    session = %session.id,
                    file = %artifact.file_name,
                    media_type = artifact.kind.as_str(),
                    "Unsupported upload"
                );
                outcome.enter(PipelineState::UnsupportedArtifact);
                return outcome;
            }

            outcome.enter(PipelineState::ExtractingText);
            tracing::info!(
                session = %session.id,
                file = %artifact.file_name,
                kind = artifact.kind.as_str(),
                size = artifact.bytes.len(),
                "Upload received"
            );
            let extracted = self.extractor.extract(&artifact.kind, &artifact.bytes);
            outcome.extraction_warnings = extracted.warnings.clone();
            if !extracted.is_empty() {
                from_image = artifact.kind.is_image();
                query = Some(extracted.text);
            }
        }

        // Typed topic is the fallback when the upload yields nothing
        let query = match query.or_else(|| {
            input
                .topic
                .as_ref()
                .filter(|t| !t.trim().is_empty())
                .cloned()
        }) {
            Some(q) => q,
            None => {
                outcome.enter(PipelineState::EmptyQuery);
                return outcome;
            }
        };
        outcome.query = Some(query.clone());

        outcome.enter(PipelineState::Classifying);
        let classification = DomainClassifier::new(&*self.llm, &self.model).classify(&query);
        let accepted = classification.accepted;
        outcome.classification = Some(classification);

        if !accepted {
            tracing::info!(session = %session.id, "Query rejected as out of domain");
            outcome.enter(PipelineState::Rejected);
            return outcome;
        }

        outcome.enter(PipelineState::Responding);
        let answer = Responder::new(&*self.llm, &self.model).respond(&query);

        match &answer {
            Answer::Generated(text) => {
                let index = session.history_mut().append(&query, text);
                outcome.history_index = Some(index);
                outcome.enter(PipelineState::Recorded);
                tracing::info!(session = %session.id, history_index = index, "Answer recorded");
            }
            Answer::Unavailable => {
                outcome.enter(PipelineState::ResponseFailed);
                tracing::warn!(session = %session.id, "Answer unavailable, history unchanged");
            }
        }

        session.show(&query, answer.text());
        outcome.show_image_reference = from_image;
        outcome.answer = Some(answer);
        outcome
    }
}
