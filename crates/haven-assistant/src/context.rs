//! Prompt assembly — the assistant persona, listing context, and
//! conversation history are folded into a single prompt string.

use haven_common::models::chat::{ChatMessage, ChatRole};
use haven_common::models::property::Property;

/// The assistant persona sent with every request.
const SYSTEM_CONTEXT: &str = "\
You are a helpful real-estate assistant for the Haven marketplace. You help \
users find properties, answer questions about listings, and give practical \
advice about buying and renting. When listings from our database are \
provided below, recommend the ones that match the user's needs and mention \
them by name. Be friendly and concise. If you don't know something, say so \
honestly.";

/// How many history messages are replayed into the prompt.
const HISTORY_WINDOW: usize = 6;

/// Format matched listings into a context block for the model.
pub fn property_context(properties: &[Property]) -> String {
    if properties.is_empty() {
        return "No properties found matching the criteria.".to_string();
    }

    let mut context = format!("Found {} properties:\n", properties.len());
    for (i, p) in properties.iter().enumerate() {
        context.push_str(&format!(
            "{}. {} in {} - €{}\n   {} rooms, {} m², {}\n",
            i + 1,
            p.name,
            p.city,
            p.price,
            p.number_of_rooms,
            p.size_sqm,
            p.property_type.as_str(),
        ));
        if !p.description.is_empty() {
            let desc: String = if p.description.chars().count() > 100 {
                let truncated: String = p.description.chars().take(100).collect();
                format!("{truncated}...")
            } else {
                p.description.clone()
            };
            context.push_str(&format!("   Description: {desc}\n"));
        }
        context.push('\n');
    }

    context
}

/// Assemble the full prompt: persona, recent history, listing context, and
/// the new user message.
pub fn assemble_prompt(history: &[ChatMessage], listings: &str, message: &str) -> String {
    let mut prompt = String::from(SYSTEM_CONTEXT);

    let recent: Vec<&ChatMessage> = history
        .iter()
        .rev()
        .take(HISTORY_WINDOW)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    if !recent.is_empty() {
        prompt.push_str("\n\nConversation history:\n");
        for msg in recent {
            let role = match msg.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            prompt.push_str(&format!("{role}: {}\n", msg.content));
        }
    }

    prompt.push_str(&format!(
        "\nAvailable properties in our database:\n{listings}\n\nUser: {message}\nAssistant:"
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use haven_common::models::property::PropertyType;
    use uuid::Uuid;

    fn listing(name: &str, city: &str, description: &str) -> Property {
        Property {
            id: Uuid::now_v7(),
            seller_id: Uuid::now_v7(),
            name: name.into(),
            description: description.into(),
            address: "Hauptstr. 1".into(),
            city: city.into(),
            price: 350_000,
            number_of_rooms: 3,
            size_sqm: 92.5,
            property_type: PropertyType::Apartment,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_context_says_so() {
        assert!(property_context(&[]).contains("No properties found"));
    }

    #[test]
    fn context_lists_each_property() {
        let props = vec![
            listing("Sunny Flat", "Berlin", "Bright and quiet."),
            listing("Canal View", "Hamburg", "Close to the water."),
        ];
        let ctx = property_context(&props);
        assert!(ctx.starts_with("Found 2 properties:"));
        assert!(ctx.contains("Sunny Flat in Berlin"));
        assert!(ctx.contains("Canal View in Hamburg"));
        assert!(ctx.contains("3 rooms, 92.5 m², apartment"));
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let long = "x".repeat(300);
        let ctx = property_context(&[listing("Big", "Berlin", &long)]);
        assert!(ctx.contains(&format!("{}...", "x".repeat(100))));
        assert!(!ctx.contains(&"x".repeat(150)));
    }

    #[test]
    fn prompt_replays_only_recent_history() {
        let session = Uuid::now_v7();
        let history: Vec<ChatMessage> = (0..10)
            .map(|i| ChatMessage {
                id: Uuid::now_v7(),
                session_id: session,
                role: if i % 2 == 0 { ChatRole::User } else { ChatRole::Assistant },
                content: format!("message {i}"),
                response_time: None,
                created_at: Utc::now(),
            })
            .collect();

        let prompt = assemble_prompt(&history, "No properties found.", "anything new?");
        // Only the last 6 messages appear
        assert!(!prompt.contains("message 3"));
        assert!(prompt.contains("message 4"));
        assert!(prompt.contains("message 9"));
        assert!(prompt.ends_with("Assistant:"));
        assert!(prompt.contains("User: anything new?"));
    }
}
