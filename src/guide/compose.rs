//! Prompt assembly and reply generation for the "Rahim" tour guide persona.

use tracing::debug;

use crate::core::place::PlaceRecord;
use crate::error::{Result, TourError};
use crate::llm::TextGenerator;
use crate::search::intent::QueryIntent;

/// Places included in the prompt context.
pub const MAX_CONTEXT_PLACES: usize = 10;
/// Description characters kept per place before "..." is appended.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Build the generation prompt for `query` over the ranked `places`.
pub fn build_prompt(query: &str, places: &[PlaceRecord], intent: &QueryIntent) -> String {
    let location = title_case(&intent.location);

    let mut context = String::new();
    for (i, place) in places.iter().take(MAX_CONTEXT_PLACES).enumerate() {
        context.push_str(&format!("\n{}. **{}** ({})", i + 1, place.name, place.division));
        if place.has_description() {
            context.push_str("\n   ");
            context.push_str(&truncate(place.description_text(), MAX_DESCRIPTION_CHARS));
        }
        context.push('\n');
    }

    format!(
        r#"You are "Rahim", a friendly and enthusiastic Bangladeshi tour guide who loves showing visitors the beauty of your country.
User asked: "{query}"
Tourist spots in/around {location}:{context}
Write a warm, conversational response (3-4 short paragraphs) that greets the traveller, highlights the most interesting spots above and adds a practical tip or two. Only mention places from the list.
"#
    )
}

/// Generate the reply text. Generator failures surface as
/// `GenerationService`; the output is returned trimmed.
pub async fn compose(
    query: &str,
    places: &[PlaceRecord],
    intent: &QueryIntent,
    generator: &dyn TextGenerator,
) -> Result<String> {
    let prompt = build_prompt(query, places, intent);
    debug!(prompt_len = prompt.len(), places = places.len(), "composing reply");

    let text = generator.generate(&prompt).await.map_err(|e| match e {
        TourError::GenerationService(_) => e,
        other => TourError::GenerationService(other.to_string()),
    })?;
    Ok(text.trim().to_string())
}

/// Cut `text` to `max` characters, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Capitalize the first letter of every whitespace-separated word and
/// lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::place::Division;
    use crate::search::intent::extract;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        prompts: Mutex<Vec<String>>,
        reply: &'static str,
    }

    #[async_trait]
    impl TextGenerator for Recorder {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push(prompt.to_string());
            }
            Ok(self.reply.to_string())
        }
    }

    struct Down;

    #[async_trait]
    impl TextGenerator for Down {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(TourError::Config("missing key".to_string()))
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 200), "short");
        let exact = "a".repeat(200);
        assert_eq!(truncate(&exact, 200), exact);
        let long = "b".repeat(201);
        assert_eq!(truncate(&long, 200), format!("{}...", "b".repeat(200)));
        // multi-byte characters count as one
        assert_eq!(truncate("বাংলাদেশ", 3), "বাং...");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("cox's bazar"), "Cox's Bazar");
        assert_eq!(title_case("SYLHET"), "Sylhet");
        assert_eq!(title_case("saint  martin"), "Saint  Martin");
    }

    #[test]
    fn test_prompt_context() {
        let places: Vec<PlaceRecord> = (1..=12)
            .map(|i| {
                PlaceRecord::new(format!("Spot {i}"), Division::Sylhet)
                    .with_description("x".repeat(250))
            })
            .collect();
        let prompt = build_prompt("top 12 in sylhet", &places, &extract("top 12 in sylhet"));

        assert!(prompt.contains("\"Rahim\""));
        assert!(prompt.contains("User asked: \"top 12 in sylhet\""));
        assert!(prompt.contains("Tourist spots in/around Sylhet:"));
        assert!(prompt.contains("\n1. **Spot 1** (Sylhet)\n"));
        assert!(prompt.contains("\n10. **Spot 10** (Sylhet)\n"));
        assert!(!prompt.contains("Spot 11"));
        assert!(prompt.contains(&format!("   {}...\n", "x".repeat(200))));
    }

    #[test]
    fn test_prompt_shows_unknown_division_and_skips_empty_description() {
        let places = vec![PlaceRecord::new("Hidden Lake", Division::Unknown)];
        let prompt = build_prompt("hidden lake", &places, &extract("hidden lake"));
        assert!(prompt.contains("\n1. **Hidden Lake** (Unknown)\n"));
        assert!(prompt.contains("in/around Hidden Lake:"));
    }

    #[tokio::test]
    async fn test_compose_trims_reply() -> anyhow::Result<()> {
        let generator = Recorder {
            prompts: Mutex::new(Vec::new()),
            reply: "  Welcome to Sylhet!\n\n",
        };
        let places = vec![PlaceRecord::new("Jaflong", Division::Sylhet)];
        let intent = extract("sylhet");

        let reply = compose("sylhet", &places, &intent, &generator).await?;
        assert_eq!(reply, "Welcome to Sylhet!");

        let prompts = generator.prompts.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("**Jaflong**"));
        Ok(())
    }

    #[tokio::test]
    async fn test_compose_failure_is_generation_error() {
        let places = vec![PlaceRecord::new("Jaflong", Division::Sylhet)];
        let err = compose("sylhet", &places, &extract("sylhet"), &Down)
            .await
            .unwrap_err();
        assert!(matches!(err, TourError::GenerationService(_)));
    }
}
