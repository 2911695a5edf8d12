//! Conversation termination detection.
//!
//! The agent gives no structured end-of-conversation signal, so the default
//! detector looks for closing phrases in its free-text reply. Anything that
//! can classify a reply as continue/terminate can replace it.

use std::fmt::Debug;

use super::flow::FlowType;

/// Decides whether an agent reply ends the conversation.
pub trait TerminationDetector: Send + Sync + Debug {
    fn is_terminal(&self, flow: FlowType, agent_text: &str) -> bool;
}

/// Token that must appear in a closing check-in reply.
const CHECKIN_CLOSING_TOKEN: &str = "gracias";

/// At least one of these must accompany the closing token.
const CHECKIN_FAREWELL_TOKENS: [&str; 4] = ["conversación", "mañana", "cuidate", "registro"];

const CRISIS_CLOSING_PHRASES: [&str; 2] = ["registro ha terminado", "proceso de registro ha terminado"];

/// Substring-based detector over the lower-cased reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordTerminationDetector;

impl TerminationDetector for KeywordTerminationDetector {
    fn is_terminal(&self, flow: FlowType, agent_text: &str) -> bool {
        let text = agent_text.to_lowercase();
        match flow {
            FlowType::Checkin => {
                text.contains(CHECKIN_CLOSING_TOKEN)
                    && CHECKIN_FAREWELL_TOKENS.iter().any(|t| text.contains(t))
            }
            FlowType::Crisis => CRISIS_CLOSING_PHRASES.iter().any(|p| text.contains(p)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal(flow: FlowType, text: &str) -> bool {
        KeywordTerminationDetector.is_terminal(flow, text)
    }

    #[test]
    fn checkin_closing_with_conversation_is_terminal() {
        assert!(terminal(
            FlowType::Checkin,
            "muy bien. gracias, esta conversación ha terminado por hoy."
        ));
    }

    #[test]
    fn checkin_closing_with_each_farewell_token_is_terminal() {
        assert!(terminal(FlowType::Checkin, "gracias por tu respuesta, hasta mañana"));
        assert!(terminal(FlowType::Checkin, "gracias, cuidate mucho"));
        assert!(terminal(FlowType::Checkin, "gracias, guardé tu registro"));
    }

    #[test]
    fn checkin_greeting_is_not_terminal() {
        assert!(!terminal(FlowType::Checkin, "hola, ¿cómo estás?"));
    }

    #[test]
    fn checkin_needs_both_tokens() {
        assert!(!terminal(FlowType::Checkin, "gracias por compartir eso"));
        assert!(!terminal(FlowType::Checkin, "hablamos mañana"));
    }

    #[test]
    fn checkin_matching_ignores_case() {
        assert!(terminal(FlowType::Checkin, "GRACIAS, hasta MAÑANA"));
    }

    #[test]
    fn crisis_closing_phrase_is_terminal() {
        assert!(terminal(
            FlowType::Crisis,
            "gracias por confiar en mí. el proceso de registro ha terminado."
        ));
        assert!(terminal(FlowType::Crisis, "tu registro ha terminado"));
    }

    #[test]
    fn crisis_checkin_phrasing_is_not_terminal() {
        assert!(!terminal(FlowType::Crisis, "gracias, hasta mañana"));
        assert!(!terminal(FlowType::Crisis, "¿qué pasó justo antes?"));
    }
}
