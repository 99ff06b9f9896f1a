//! HandleTurn command handler - the per-turn response orchestrator.
//!
//! Drives one visitor message through
//! `LOADING_HISTORY → EXTRACTING → RETRIEVING → GENERATING → RECONCILING →
//! [EMITTING_LEAD] → PERSISTING → DONE`.
//!
//! Generation, retrieval and CRM failures degrade the turn instead of failing
//! it. Only a storage failure is surfaced, since the turn could not be
//! recorded.

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::application::services::{
    ConversationState, ForwardOutcome, KnowledgeRetriever, LeadForwarder, SessionSnapshot,
};
use crate::domain::contact::{Contact, MergeOutcome};
use crate::domain::conversation::{clean_summary, PromptBuilder, StructuredReply, TurnPhase};
use crate::domain::extraction::{CandidateFields, EntityExtractor};
use crate::domain::foundation::{ContactId, DomainError, SessionId};
use crate::ports::{AIProvider, CompletionPurpose, CompletionRequest, RequestMetadata};

/// Command carrying one inbound visitor message.
#[derive(Debug, Clone)]
pub struct HandleTurnCommand {
    pub message: String,
    /// Caller-supplied session id; a new one is generated when absent or blank.
    pub session_id: Option<String>,
}

impl HandleTurnCommand {
    pub fn new(message: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            session_id,
        }
    }
}

#[derive(Debug, Error)]
pub enum HandleTurnError {
    #[error("Validation error: message cannot be empty")]
    EmptyMessage,

    /// The turn could not be loaded or recorded.
    #[error("Repository error: {0}")]
    Repository(#[from] DomainError),
}

/// Result of a handled turn.
#[derive(Debug, Clone)]
pub struct HandleTurnResult {
    pub reply: String,
    pub session_id: SessionId,
    pub contact_id: Option<ContactId>,
    /// Present only on the turn that completed the contact.
    pub lead: Option<ForwardOutcome>,
    /// True when the apology replaced a failed generation.
    pub degraded: bool,
}

/// Tunables applied to every turn.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub top_k: usize,
    pub score_threshold: f32,
    pub temperature: f32,
    pub max_tokens: u32,
    pub summary_max_tokens: u32,
    /// Reply used when generation fails.
    pub apology: String,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            top_k: 10,
            score_threshold: 0.3,
            temperature: 0.7,
            max_tokens: 500,
            summary_max_tokens: 200,
            apology: "Извините, произошла ошибка при обработке запроса. Попробуйте позже."
                .to_string(),
        }
    }
}

/// Tracks the turn's position in the state machine.
struct TurnProgress<'a> {
    phase: TurnPhase,
    session_id: &'a SessionId,
}

impl<'a> TurnProgress<'a> {
    fn start(session_id: &'a SessionId) -> Self {
        tracing::debug!(session_id = %session_id, phase = TurnPhase::LoadingHistory.label(), "turn started");
        Self {
            phase: TurnPhase::LoadingHistory,
            session_id,
        }
    }

    fn advance(&mut self, emit_lead: bool) {
        if let Some(next) = self.phase.next(emit_lead) {
            tracing::debug!(
                session_id = %self.session_id,
                from = self.phase.label(),
                to = next.label(),
                "turn phase"
            );
            self.phase = next;
        }
    }
}

/// Reply text plus the fields the model extracted alongside it.
struct Generated {
    structured: StructuredReply,
    degraded: bool,
}

/// Handler for HandleTurn commands.
pub struct ResponseOrchestrator {
    state: Arc<ConversationState>,
    extractor: Arc<EntityExtractor>,
    retriever: Arc<KnowledgeRetriever>,
    ai_provider: Arc<dyn AIProvider>,
    forwarder: Arc<LeadForwarder>,
    prompts: PromptBuilder,
    settings: TurnSettings,
}

impl ResponseOrchestrator {
    pub fn new(
        state: Arc<ConversationState>,
        extractor: Arc<EntityExtractor>,
        retriever: Arc<KnowledgeRetriever>,
        ai_provider: Arc<dyn AIProvider>,
        forwarder: Arc<LeadForwarder>,
    ) -> Self {
        Self {
            state,
            extractor,
            retriever,
            ai_provider,
            forwarder,
            prompts: PromptBuilder::new(),
            settings: TurnSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: TurnSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub async fn handle(&self, cmd: HandleTurnCommand) -> Result<HandleTurnResult, HandleTurnError> {
        let message = cmd.message.trim();
        if message.is_empty() {
            return Err(HandleTurnError::EmptyMessage);
        }

        let session_id = SessionId::resolve_or_generate(cmd.session_id.as_deref());
        let trace_id = Uuid::new_v4().to_string();
        let mut progress = TurnProgress::start(&session_id);

        // LOADING_HISTORY
        let snapshot = self.state.resolve_session(&session_id).await?;
        let prior_turns = snapshot.prior.len();
        progress.advance(false);

        // EXTRACTING
        let regex_fields = self
            .extractor
            .extract_with_history(message, snapshot.prior_user_texts());
        tracing::debug!(
            session_id = %session_id,
            name_found = regex_fields.name.is_some(),
            phone_found = regex_fields.phone.is_some(),
            "pattern extraction finished"
        );
        progress.advance(false);

        // RETRIEVING
        let fragments = self
            .retriever
            .retrieve(message, self.settings.top_k, self.settings.score_threshold)
            .await;
        progress.advance(false);

        // GENERATING
        let generated = self
            .generate(&snapshot, &fragments, message, &trace_id)
            .await;
        progress.advance(false);

        // RECONCILING
        // Overlapping turns of this session may have linked a contact since
        // the history was loaded; re-read it before deciding anything.
        let _session = self.state.lock_session(&session_id).await;
        let snapshot = self.state.resolve_session(&session_id).await?;
        let regex_fields = if snapshot.prior.len() > prior_turns {
            self.extractor
                .extract_with_history(message, snapshot.prior_user_texts())
        } else {
            regex_fields
        };
        let candidates = regex_fields.overridden_by(&generated.structured.fields);
        let outcome = self.reconcile(&snapshot, &candidates).await;
        let emit_lead = outcome.as_ref().is_some_and(MergeOutcome::completes_contact);
        let contact = outcome
            .map(|o| o.contact)
            .or_else(|| snapshot.contact.clone());
        progress.advance(emit_lead);

        // EMITTING_LEAD
        let lead = match contact.as_ref() {
            Some(contact) if emit_lead => {
                let lead = self
                    .emit_lead(contact, &snapshot, message, &generated.structured.reply, &trace_id)
                    .await;
                progress.advance(false);
                Some(lead)
            }
            _ => None,
        };

        // PERSISTING
        let contact_id = contact.as_ref().map(|c| c.id);
        if let Some(ref id) = contact_id {
            if snapshot.prior.iter().any(|r| r.contact_id.is_none()) {
                self.state.link_session_to_contact(&session_id, id).await?;
            }
        }
        self.state
            .append_turn(&session_id, contact_id, message, &generated.structured.reply)
            .await?;
        progress.advance(false);

        tracing::info!(
            session_id = %session_id,
            contact_id = ?contact_id,
            degraded = generated.degraded,
            lead_emitted = lead.is_some(),
            "turn handled"
        );

        Ok(HandleTurnResult {
            reply: generated.structured.reply,
            session_id,
            contact_id,
            lead,
            degraded: generated.degraded,
        })
    }

    async fn generate(
        &self,
        snapshot: &SessionSnapshot,
        fragments: &[crate::domain::knowledge::KnowledgeFragment],
        message: &str,
        trace_id: &str,
    ) -> Generated {
        let prompt =
            self.prompts
                .turn_prompt(snapshot.contact.as_ref(), fragments, &snapshot.prior, message);
        let request = CompletionRequest::from_prompt(
            prompt,
            RequestMetadata::new(
                Some(snapshot.session_id.clone()),
                CompletionPurpose::Reply,
                trace_id,
            ),
        )
        .with_max_tokens(self.settings.max_tokens)
        .with_temperature(self.settings.temperature);

        match self.ai_provider.complete(request).await {
            Ok(response) => {
                let structured = StructuredReply::parse_or_raw(&response.content);
                if structured.reply.is_empty() {
                    tracing::warn!(session_id = %snapshot.session_id, "model returned an empty reply");
                    return self.apology();
                }
                Generated {
                    structured,
                    degraded: false,
                }
            }
            Err(err) => {
                tracing::error!(
                    session_id = %snapshot.session_id,
                    error = %err,
                    "reply generation failed, sending apology"
                );
                self.apology()
            }
        }
    }

    fn apology(&self) -> Generated {
        Generated {
            structured: StructuredReply {
                reply: self.settings.apology.clone(),
                fields: CandidateFields::default(),
            },
            degraded: true,
        }
    }

    async fn reconcile(
        &self,
        snapshot: &SessionSnapshot,
        candidates: &CandidateFields,
    ) -> Option<MergeOutcome> {
        match self
            .state
            .merge_contact(snapshot.contact.as_ref(), candidates)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(
                    session_id = %snapshot.session_id,
                    error = %err,
                    "contact merge failed, keeping previous contact state"
                );
                None
            }
        }
    }

    async fn emit_lead(
        &self,
        contact: &Contact,
        snapshot: &SessionSnapshot,
        message: &str,
        reply: &str,
        trace_id: &str,
    ) -> ForwardOutcome {
        let summary = self.summarize(snapshot, message, reply, trace_id).await;
        let outcome = self
            .forwarder
            .forward(
                contact.name.as_deref().unwrap_or_default(),
                contact.phone.as_deref().unwrap_or_default(),
                &summary,
                Some(&snapshot.session_id),
            )
            .await;

        if outcome.success {
            tracing::info!(
                session_id = %snapshot.session_id,
                contact_id = %contact.id,
                lead_id = outcome.lead_id.as_deref().unwrap_or_default(),
                "lead forwarded"
            );
        } else {
            tracing::warn!(
                session_id = %snapshot.session_id,
                contact_id = %contact.id,
                error = outcome.error.as_deref().unwrap_or_default(),
                "lead forwarding failed"
            );
        }
        outcome
    }

    /// Short summary of the session for the lead comment; empty on failure.
    async fn summarize(
        &self,
        snapshot: &SessionSnapshot,
        message: &str,
        reply: &str,
        trace_id: &str,
    ) -> String {
        let mut transcript: Vec<(String, String)> = snapshot
            .prior
            .iter()
            .map(|r| (r.message.clone(), r.reply().to_string()))
            .collect();
        transcript.push((message.to_string(), reply.to_string()));

        let Some(prompt) = self.prompts.summary_prompt(&transcript) else {
            return String::new();
        };
        let request = CompletionRequest::from_prompt(
            prompt,
            RequestMetadata::new(
                Some(snapshot.session_id.clone()),
                CompletionPurpose::Summary,
                trace_id,
            ),
        )
        .with_max_tokens(self.settings.summary_max_tokens)
        .with_temperature(0.3);

        match self.ai_provider.complete(request).await {
            Ok(response) => clean_summary(&response.content),
            Err(err) => {
                tracing::warn!(session_id = %snapshot.session_id, error = %err, "lead summary failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockEmbeddingProvider, MockError};
    use crate::adapters::crm::RecordingCrmGateway;
    use crate::adapters::knowledge::InMemoryVectorIndex;
    use crate::adapters::memory::{InMemoryContactRepository, InMemoryMessageRepository};

    struct Fixture {
        orchestrator: ResponseOrchestrator,
        ai: MockAIProvider,
        crm: RecordingCrmGateway,
        messages: Arc<InMemoryMessageRepository>,
    }

    fn fixture(ai: MockAIProvider) -> Fixture {
        let contacts = Arc::new(InMemoryContactRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        let crm = RecordingCrmGateway::new();
        let orchestrator = ResponseOrchestrator::new(
            Arc::new(ConversationState::new(contacts, messages.clone())),
            Arc::new(EntityExtractor::default()),
            Arc::new(KnowledgeRetriever::new(
                Arc::new(MockEmbeddingProvider::new(16)),
                Arc::new(InMemoryVectorIndex::new()),
            )),
            Arc::new(ai.clone()),
            Arc::new(LeadForwarder::new(Arc::new(crm.clone()))),
        );
        Fixture {
            orchestrator,
            ai,
            crm,
            messages,
        }
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let f = fixture(MockAIProvider::new());
        let err = f
            .orchestrator
            .handle(HandleTurnCommand::new("   ", None))
            .await
            .unwrap_err();
        assert!(matches!(err, HandleTurnError::EmptyMessage));
        assert_eq!(f.ai.call_count(), 0);
    }

    #[tokio::test]
    async fn generates_session_id_when_absent() {
        let f = fixture(MockAIProvider::new().with_response(r#"{"reply":"Здравствуйте!"}"#));
        let result = f
            .orchestrator
            .handle(HandleTurnCommand::new("Привет", None))
            .await
            .unwrap();

        assert_eq!(result.reply, "Здравствуйте!");
        assert!(!result.session_id.as_str().is_empty());
        assert!(result.contact_id.is_none());
        assert_eq!(f.messages.all().await.len(), 1);
    }

    #[tokio::test]
    async fn generation_failure_sends_apology_and_still_persists() {
        let f = fixture(MockAIProvider::new().with_error(MockError::Timeout { timeout_secs: 60 }));
        let result = f
            .orchestrator
            .handle(HandleTurnCommand::new("Сколько стоит урок?", Some("s-1".into())))
            .await
            .unwrap();

        assert!(result.degraded);
        assert_eq!(result.reply, TurnSettings::default().apology);
        let stored = f.messages.all().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].message, "Сколько стоит урок?");
    }

    #[tokio::test]
    async fn malformed_output_becomes_reply_without_fields() {
        let f = fixture(MockAIProvider::new().with_response("Просто текст без JSON"));
        let result = f
            .orchestrator
            .handle(HandleTurnCommand::new("Сколько стоит урок?", None))
            .await
            .unwrap();

        assert_eq!(result.reply, "Просто текст без JSON");
        assert!(!result.degraded);
        assert!(result.contact_id.is_none());
    }

    #[tokio::test]
    async fn model_fields_take_precedence_over_patterns() {
        let f = fixture(MockAIProvider::new().with_response(
            r#"{"reply":"Приятно познакомиться, Анна!","name":"Анна","phone":null}"#,
        ));
        let result = f
            .orchestrator
            .handle(HandleTurnCommand::new("Я Аня, меня зовут Анна", Some("s-2".into())))
            .await
            .unwrap();

        assert!(result.contact_id.is_some());
        let stored = f.messages.all().await;
        assert_eq!(stored[0].contact_id, result.contact_id);
        assert_eq!(f.crm.call_count(), 0);
    }

    #[tokio::test]
    async fn completing_turn_emits_lead_with_summary() {
        let ai = MockAIProvider::new()
            .with_response(r#"{"reply":"Спасибо, Иван! Мы перезвоним.","name":"Иван","phone":"89371234378"}"#)
            .with_response("Хочет записаться на пробный урок.");
        let f = fixture(ai);

        let result = f
            .orchestrator
            .handle(HandleTurnCommand::new(
                "Меня зовут Иван, мой номер 89371234378",
                Some("s-3".into()),
            ))
            .await
            .unwrap();

        let lead = result.lead.unwrap();
        assert!(lead.success);
        let leads = f.crm.leads();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Иван");
        assert_eq!(leads[0].phone, "+79371234378");
        assert!(leads[0].comments.starts_with("Хочет записаться на пробный урок."));
        assert!(leads[0].comments.contains("s-3"));
        assert_eq!(f.ai.calls_for(CompletionPurpose::Summary), 1);
    }

    #[tokio::test]
    async fn summary_failure_still_forwards_lead() {
        let ai = MockAIProvider::new()
            .with_response(r#"{"reply":"Спасибо!","name":"Иван","phone":"+7 937 123 43 78"}"#)
            .with_error(MockError::Unavailable {
                message: "overloaded".to_string(),
            });
        let f = fixture(ai);

        let result = f
            .orchestrator
            .handle(HandleTurnCommand::new("Иван, +7 937 123 43 78", Some("s-4".into())))
            .await
            .unwrap();

        assert!(result.lead.unwrap().success);
        assert_eq!(f.crm.leads()[0].comments, "Chat session: s-4");
    }

    #[tokio::test]
    async fn custom_preamble_is_sent_to_the_model() {
        let ai = MockAIProvider::new().with_response(r#"{"reply":"Добрый день!"}"#);
        let mut f = fixture(ai);
        f.orchestrator = f
            .orchestrator
            .with_prompts(PromptBuilder::new().with_preamble("Ты администратор вокальной студии."));

        f.orchestrator
            .handle(HandleTurnCommand::new("Здравствуйте", Some("s-5".into())))
            .await
            .unwrap();

        let calls = f.ai.get_calls();
        let system = calls[0].system_prompt.as_deref().unwrap_or_default();
        assert!(system.starts_with("Ты администратор вокальной студии."));
    }
}
