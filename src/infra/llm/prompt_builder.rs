use std::fmt::Write;

use crate::domain::{ConversationMessage, TripContext};

const PLAN_INSTRUCTION: &str = "Output: Return a markdown-like plain text of a day-by-day itinerary (morning/afternoon/evening) with short explanations. If interest not available, suggest reasonable alternative. No comment.";
const CHAT_CLOSING: &str = "Respond concisely and helpfully.";

pub struct PromptBuilder;

impl PromptBuilder {
    /// Initial itinerary request built from the trip parameters alone.
    pub fn plan(context: &TripContext) -> String {
        format!(
            "You are a concise travel planner. Input: {fields}. {PLAN_INSTRUCTION}",
            fields = render_trip_fields(context),
        )
    }

    /// Follow-up request: trip context, the transcript so far, then the new
    /// user line and an open `Assistant:` cue.
    pub fn chat(
        context: &TripContext,
        new_message: &str,
        history: &[ConversationMessage],
    ) -> String {
        let mut conversation = String::new();
        for message in history {
            let _ = writeln!(conversation, "{}: {}", message.role.label(), message.content);
        }
        let _ = write!(conversation, "User: {new_message}\nAssistant:");

        format!(
            "You are a concise travel assistant. Context: {fields}.\n\nConversation:\n{conversation}\n{CHAT_CLOSING}",
            fields = render_trip_fields(context),
        )
    }
}

fn render_trip_fields(context: &TripContext) -> String {
    format!(
        "Origin: {origin}, Destination: {destination}, Dates: {start} to {end}, Interests: {interests}, Pace: {pace}",
        origin = context.origin,
        destination = context.destination,
        start = context.start_date,
        end = context.end_date,
        interests = render_sequence(&context.interests),
        pace = context.pace,
    )
}

/// Literal list form, e.g. `['Food', 'Museums']`.
fn render_sequence(items: &[String]) -> String {
    let rendered = items
        .iter()
        .map(|item| quote_item(item))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{rendered}]")
}

fn quote_item(item: &str) -> String {
    let quote = if item.contains('\'') && !item.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut quoted = String::with_capacity(item.len() + 2);
    quoted.push(quote);
    for ch in item.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            ch if ch == quote => {
                quoted.push('\\');
                quoted.push(ch);
            }
            ch => quoted.push(ch),
        }
    }
    quoted.push(quote);
    quoted
}

#[cfg(test)]
mod tests {
    use super::{PromptBuilder, render_sequence};
    use crate::domain::{ConversationMessage, TripContext};

    fn trip() -> TripContext {
        TripContext {
            origin: "Hanoi".to_string(),
            destination: "Da Nang".to_string(),
            start_date: "1-7-2026".to_string(),
            end_date: "4-7-2026".to_string(),
            interests: vec!["Food".to_string(), "Museums".to_string()],
            pace: "Relaxed".to_string(),
        }
    }

    #[test]
    fn plan_prompt_embeds_trip_fields() {
        let prompt = PromptBuilder::plan(&trip());

        assert_eq!(
            prompt,
            "You are a concise travel planner. Input: Origin: Hanoi, Destination: Da Nang, Dates: 1-7-2026 to 4-7-2026, Interests: ['Food', 'Museums'], Pace: Relaxed. Output: Return a markdown-like plain text of a day-by-day itinerary (morning/afternoon/evening) with short explanations. If interest not available, suggest reasonable alternative. No comment."
        );
    }

    #[test]
    fn plan_prompt_is_deterministic() {
        assert_eq!(PromptBuilder::plan(&trip()), PromptBuilder::plan(&trip()));
    }

    #[test]
    fn plan_prompt_renders_empty_interest_list() {
        let mut trip = trip();
        trip.interests.clear();

        assert!(PromptBuilder::plan(&trip).contains("Interests: [], Pace: Relaxed."));
    }

    #[test]
    fn chat_prompt_with_empty_history_has_single_user_line() {
        let prompt = PromptBuilder::chat(&trip(), "Add a beach day", &[]);

        assert_eq!(prompt.matches("User:").count(), 1);
        assert!(prompt.contains("Conversation:\nUser: Add a beach day\nAssistant:\n"));
        assert!(prompt.starts_with(
            "You are a concise travel assistant. Context: Origin: Hanoi, Destination: Da Nang"
        ));
        assert!(prompt.ends_with("Assistant:\nRespond concisely and helpfully."));
    }

    #[test]
    fn chat_prompt_preserves_history_order() {
        let history = vec![
            ConversationMessage::user("A"),
            ConversationMessage::assistant("B"),
        ];
        let prompt = PromptBuilder::chat(&trip(), "C", &history);
        let lines = prompt.lines().collect::<Vec<_>>();

        let start = lines
            .iter()
            .position(|line| *line == "Conversation:")
            .expect("conversation header should be present");
        assert_eq!(
            &lines[start + 1..start + 5],
            &["User: A", "Assistant: B", "User: C", "Assistant:"]
        );
    }

    #[test]
    fn render_sequence_switches_quote_for_apostrophes() {
        let items = vec!["Night-life".to_string(), "Children's museums".to_string()];

        assert_eq!(
            render_sequence(&items),
            "['Night-life', \"Children's museums\"]"
        );
    }

    #[test]
    fn render_sequence_escapes_when_both_quotes_present() {
        let items = vec!["it's \"fun\"".to_string()];

        assert_eq!(render_sequence(&items), "['it\\'s \"fun\"']");
    }
}
