//! Chat session: the submit/clear event loop over one conversation.
//!
//! `on_submit` performs append -> generate -> append and hands back the
//! redrawn view. The model handle is acquired before anything is appended,
//! so a load failure leaves the conversation untouched; a generation
//! failure leaves the user turn in place with no reply after it.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use healthmate_types::chat::{ChatView, Turn};
use healthmate_types::error::ChatError;

use crate::llm::provider::{ModelLoader, ModelProvider};

use super::conversation::ConversationStore;
use super::responder::ResponseGenerator;
use super::shortcuts::{QUICK_QUESTIONS, QuickAction, quick_question};

/// Assistant greeting that opens every new session.
pub const GREETING: &str = "👋 Hello! I'm HealthMate AI. How can I help?";

/// One user's chat session. Never shared between users.
#[derive(Debug)]
pub struct ChatSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    conversation: ConversationStore,
}

impl ChatSession {
    /// Start a session seeded with the assistant greeting.
    pub fn new() -> Self {
        let mut session = Self::empty();
        session.conversation.append(Turn::assistant(GREETING));
        session
    }

    /// Start a session with no turns at all.
    pub fn empty() -> Self {
        Self {
            id: Uuid::now_v7(),
            started_at: Utc::now(),
            conversation: ConversationStore::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn turns(&self) -> &[Turn] {
        self.conversation.all()
    }

    /// Handle a submitted utterance. Any text, including empty, is accepted.
    pub async fn on_submit<L: ModelLoader>(
        &mut self,
        provider: &ModelProvider<L>,
        utterance: &str,
    ) -> Result<ChatView, ChatError> {
        let generator = provider.get().await?;

        self.conversation.append(Turn::user(utterance));

        let responder = ResponseGenerator::new(generator);
        let content = match responder.respond(utterance).await {
            Ok(content) => content,
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Generation failed");
                return Err(e.into());
            }
        };

        let reply = Turn::assistant(content);
        self.conversation.append(reply.clone());
        info!(session_id = %self.id, turns = self.conversation.len(), "Reply appended");

        Ok(ChatView {
            turns: self.conversation.all().to_vec(),
            reply,
        })
    }

    /// Submit the label of quick question `index` as if it were typed.
    pub async fn on_quick_question<L: ModelLoader>(
        &mut self,
        provider: &ModelProvider<L>,
        index: usize,
    ) -> Result<ChatView, ChatError> {
        let label = quick_question(index).ok_or(ChatError::InvalidQuickQuestion {
            index,
            count: QUICK_QUESTIONS.len(),
        })?;
        self.on_submit(provider, label).await
    }

    /// Static notice for a quick action. Touches nothing.
    pub fn on_quick_action(&self, action: QuickAction) -> &'static str {
        action.notice()
    }

    /// Drop every turn, greeting included.
    pub fn clear(&mut self) {
        info!(session_id = %self.id, "Conversation cleared");
        self.conversation.clear();
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use healthmate_types::chat::Role;

    use super::*;
    use crate::chat::triage::EMERGENCY_BANNER;
    use crate::llm::provider::testing::MockLoader;

    #[test]
    fn test_new_session_has_greeting() {
        let session = ChatSession::new();
        assert_eq!(session.turns().len(), 1);
        assert_eq!(session.turns()[0].role, Role::Assistant);
        assert_eq!(session.turns()[0].content, GREETING);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let a = ChatSession::new();
        let b = ChatSession::new();
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_submit_appends_user_then_assistant() {
        let provider = ModelProvider::new(MockLoader::ok("Drink plenty of fluids."));
        let mut session = ChatSession::new();

        let view = session
            .on_submit(&provider, "I have a fever, what should I do?")
            .await
            .unwrap();

        assert_eq!(view.turns.len(), 3);
        assert_eq!(view.turns[1].role, Role::User);
        assert_eq!(view.turns[1].content, "I have a fever, what should I do?");
        assert_eq!(view.turns[2].role, Role::Assistant);
        assert_eq!(view.turns[2].content, "Drink plenty of fluids.");
        assert_eq!(view.reply, view.turns[2]);
        assert_eq!(session.turns().len(), 3);
    }

    #[tokio::test]
    async fn test_only_latest_utterance_reaches_model() {
        let loader = MockLoader::ok("ok");
        let prompts = loader.prompts.clone();
        let provider = ModelProvider::new(loader);
        let mut session = ChatSession::new();

        session.on_submit(&provider, "first question").await.unwrap();
        session.on_submit(&provider, "second question").await.unwrap();

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("second question"));
        assert!(!prompts[1].contains("first question"));
    }

    #[tokio::test]
    async fn test_emergency_submit() {
        let provider = ModelProvider::new(MockLoader::ok("Stay calm."));
        let mut session = ChatSession::new();

        let view = session
            .on_submit(&provider, "I think I'm having a heart attack")
            .await
            .unwrap();
        assert!(view.reply.content.starts_with(EMERGENCY_BANNER));
    }

    #[tokio::test]
    async fn test_load_failure_appends_nothing() {
        let provider = ModelProvider::new(MockLoader::broken());
        let mut session = ChatSession::new();

        let err = session.on_submit(&provider, "hello").await.unwrap_err();
        assert!(matches!(err, ChatError::Load(_)));
        assert!(session.on_submit(&provider, "again").await.is_err());
        assert_eq!(session.turns().len(), 1);

        provider.loader().broken.store(false, Ordering::SeqCst);
        session.on_submit(&provider, "now?").await.unwrap();
        assert_eq!(session.turns().len(), 3);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_user_turn() {
        let provider = ModelProvider::new(MockLoader::generation_failure("cuda oom"));
        let mut session = ChatSession::new();

        let err = session.on_submit(&provider, "Sleep Tips").await.unwrap_err();
        assert!(matches!(err, ChatError::Generation(_)));
        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.turns()[1].role, Role::User);
    }

    #[tokio::test]
    async fn test_empty_utterance_is_accepted() {
        let provider = ModelProvider::new(MockLoader::ok("How can I help?"));
        let mut session = ChatSession::empty();

        let view = session.on_submit(&provider, "").await.unwrap();
        assert_eq!(view.turns.len(), 2);
        assert_eq!(view.turns[0].content, "");
    }

    #[tokio::test]
    async fn test_quick_question_submits_label() {
        let loader = MockLoader::ok("Aim for 7-9 hours.");
        let prompts = loader.prompts.clone();
        let provider = ModelProvider::new(loader);
        let mut session = ChatSession::new();

        let view = session.on_quick_question(&provider, 3).await.unwrap();
        assert_eq!(view.turns[1].content, "Sleep Tips");
        assert!(prompts.lock().unwrap()[0].contains("<|user|>\nSleep Tips<|end|>\n"));
    }

    #[tokio::test]
    async fn test_quick_question_out_of_range() {
        let provider = ModelProvider::new(MockLoader::ok("x"));
        let mut session = ChatSession::new();

        let err = session.on_quick_question(&provider, 9).await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::InvalidQuickQuestion { index: 9, count: 4 }
        ));
        assert_eq!(session.turns().len(), 1);
        assert_eq!(provider.loader().load_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_then_continue() {
        let provider = ModelProvider::new(MockLoader::ok("answer"));
        let mut session = ChatSession::new();
        session.on_submit(&provider, "q").await.unwrap();

        session.clear();
        assert!(session.turns().is_empty());

        let view = session.on_submit(&provider, "q2").await.unwrap();
        assert_eq!(view.turns.len(), 2);
        assert_eq!(view.turns[0].content, "q2");
    }

    #[test]
    fn test_quick_actions_do_not_touch_history() {
        let session = ChatSession::new();
        assert_eq!(session.on_quick_action(QuickAction::Emergency), "Call: 1122");
        assert_eq!(session.on_quick_action(QuickAction::Hospitals), "Finding hospitals...");
        assert_eq!(session.turns().len(), 1);
    }
}
