use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use airdesk_core::domain::conversation::{ConversationTurn, Role};

use crate::llm::{ChatMessage, LlmClient};

/// Where the triage step sends a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Booking,
    Faq,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Faq => "faq",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse_label(label: &str) -> Option<Self> {
        let label = label
            .trim()
            .trim_matches(|c: char| !c.is_ascii_alphanumeric())
            .to_ascii_lowercase();
        match label.as_str() {
            "booking" => Some(Self::Booking),
            "faq" => Some(Self::Faq),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, message: &str, history: &[ConversationTurn]) -> Intent;
}

const BOOKING_WORDS: &[&str] = &[
    "book", "booked", "booking", "bookings", "reserve", "reservation", "cancel", "update", "change",
    "ticket",
];
const FAQ_WORDS: &[&str] =
    &["bag", "bags", "baggage", "luggage", "wifi", "plane", "seats", "legroom"];

fn words(message: &str) -> Vec<String> {
    message
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '-')
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_lowercase())
        .collect()
}

/// Keyword routing. Booking vocabulary is checked before FAQ vocabulary.
#[derive(Clone, Debug, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify_text(&self, message: &str) -> Intent {
        let lowered = message.to_ascii_lowercase();
        let words = words(&lowered);
        let has_word = |candidates: &[&str]| words.iter().any(|word| candidates.contains(&word.as_str()));

        if has_word(BOOKING_WORDS) || lowered.contains("my seat") {
            Intent::Booking
        } else if has_word(FAQ_WORDS) || lowered.contains("exit row") {
            Intent::Faq
        } else {
            Intent::Unknown
        }
    }
}

#[async_trait]
impl IntentClassifier for RuleClassifier {
    async fn classify(&self, message: &str, _history: &[ConversationTurn]) -> Intent {
        self.classify_text(message)
    }
}

const CLASSIFIER_PROMPT: &str = "Classify the customer's latest message for an airline support desk.\n\
Answer with exactly one word:\n\
- booking: booking, cancelling or changing a seat, or listing booked seats\n\
- faq: questions about baggage, seating on the plane or wifi\n\
- unknown: anything else";

const HISTORY_WINDOW: usize = 6;

/// Model-backed classifier. Any provider failure or unexpected label falls back to rules.
pub struct LlmClassifier {
    client: Arc<dyn LlmClient>,
    instructions: String,
    fallback: RuleClassifier,
}

impl LlmClassifier {
    pub fn new(client: Arc<dyn LlmClient>, instructions: impl Into<String>) -> Self {
        Self { client, instructions: instructions.into(), fallback: RuleClassifier }
    }

    fn messages(&self, message: &str, history: &[ConversationTurn]) -> Vec<ChatMessage> {
        let mut messages =
            vec![ChatMessage::system(format!("{}\n\n{CLASSIFIER_PROMPT}", self.instructions))];
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        messages.extend(history[start..].iter().map(|turn| match turn.role {
            Role::User => ChatMessage::user(turn.content.clone()),
            Role::Assistant => ChatMessage::assistant(turn.content.clone()),
        }));
        messages.push(ChatMessage::user(message));
        messages
    }
}

#[async_trait]
impl IntentClassifier for LlmClassifier {
    async fn classify(&self, message: &str, history: &[ConversationTurn]) -> Intent {
        match self.client.complete(&self.messages(message, history)).await {
            Ok(label) => match Intent::parse_label(&label) {
                Some(intent) => {
                    debug!(intent = intent.as_str(), "llm classified message");
                    intent
                }
                None => {
                    warn!(
                        event_name = "routing.classifier_fallback",
                        label = %label,
                        "llm returned an unexpected label, using rules"
                    );
                    self.fallback.classify_text(message)
                }
            },
            Err(error) => {
                warn!(
                    event_name = "routing.classifier_fallback",
                    error = %error,
                    "llm classification failed, using rules"
                );
                self.fallback.classify_text(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use airdesk_core::domain::conversation::ConversationTurn;

    use super::{Intent, IntentClassifier, LlmClassifier, RuleClassifier};
    use crate::llm::{ChatMessage, LlmClient, LlmError};

    #[test]
    fn rules_route_booking_vocabulary_first() {
        let rules = RuleClassifier::new();

        assert_eq!(rules.classify_text("I want to book a flight"), Intent::Booking);
        assert_eq!(rules.classify_text("Please cancel my ticket"), Intent::Booking);
        assert_eq!(rules.classify_text("Can I change my seat on the plane?"), Intent::Booking);
        assert_eq!(rules.classify_text("Show my bookings"), Intent::Booking);
    }

    #[test]
    fn rules_route_faq_vocabulary() {
        let rules = RuleClassifier::new();

        assert_eq!(rules.classify_text("How much baggage can I bring?"), Intent::Faq);
        assert_eq!(rules.classify_text("Is there WiFi?"), Intent::Faq);
        assert_eq!(rules.classify_text("Which is the exit row?"), Intent::Faq);
        assert_eq!(rules.classify_text("What's the weather in Lahore?"), Intent::Unknown);
    }

    #[test]
    fn labels_tolerate_case_and_punctuation() {
        assert_eq!(Intent::parse_label(" Booking.\n"), Some(Intent::Booking));
        assert_eq!(Intent::parse_label("`faq`"), Some(Intent::Faq));
        assert_eq!(Intent::parse_label("it is about booking"), None);
    }

    struct ScriptedClient {
        reply: Result<String, ()>,
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
            self.seen.lock().expect("lock").extend_from_slice(messages);
            self.reply.clone().map_err(|()| LlmError::EmptyResponse)
        }
    }

    fn classifier(reply: Result<String, ()>) -> (Arc<ScriptedClient>, LlmClassifier) {
        let client = Arc::new(ScriptedClient { reply, seen: Mutex::new(Vec::new()) });
        (client.clone(), LlmClassifier::new(client, "You are a triage agent."))
    }

    #[tokio::test]
    async fn llm_label_is_used_when_valid() {
        let (client, classifier) = classifier(Ok("faq".to_string()));
        let history = vec![ConversationTurn::user("hello"), ConversationTurn::assistant("hi")];

        let intent = classifier.classify("tell me something", &history).await;

        assert_eq!(intent, Intent::Faq);
        let seen = client.seen.lock().expect("lock");
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0].role, "system");
        assert_eq!(seen[3].content, "tell me something");
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_rules() {
        let (_, classifier) = classifier(Err(()));

        assert_eq!(classifier.classify("cancel my booking", &[]).await, Intent::Booking);
        assert_eq!(classifier.classify("is there wifi", &[]).await, Intent::Faq);
    }

    #[tokio::test]
    async fn unexpected_label_falls_back_to_rules() {
        let (_, classifier) = classifier(Ok("I think this is about luggage".to_string()));

        assert_eq!(classifier.classify("how heavy can my luggage be", &[]).await, Intent::Faq);
    }

    #[tokio::test]
    async fn history_window_is_bounded() {
        let (client, classifier) = classifier(Ok("unknown".to_string()));
        let history = (0..20).map(|i| ConversationTurn::user(format!("turn {i}"))).collect::<Vec<_>>();

        classifier.classify("latest", &history).await;

        let seen = client.seen.lock().expect("lock");
        assert_eq!(seen.len(), 1 + 6 + 1);
        assert_eq!(seen[1].content, "turn 14");
    }
}
