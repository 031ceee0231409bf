//! The tour guide request boundary.
//!
//! Every failure below this point is turned into a structured
//! `QueryResponse::Failure`; callers never see an `Err` from `answer`.

use std::sync::Arc;

use tracing::{info, warn};

use super::compose::compose;
use super::payload::{QueryRequest, QueryResponse, TourAnswer};
use crate::config::SearchSettings;
use crate::core::place::PlaceRecord;
use crate::core::stats::DatasetStats;
use crate::core::store::PlaceStore;
use crate::error::{Result, TourError};
use crate::llm::TextGenerator;
use crate::search::engine::SemanticEngine;
use crate::search::intent::{extract, LocationType, QueryIntent};
use crate::search::rank::rank;

#[derive(Clone)]
pub struct TourGuide {
    store: Arc<PlaceStore>,
    semantic: Option<SemanticEngine>,
    generator: Arc<dyn TextGenerator>,
    settings: SearchSettings,
}

impl TourGuide {
    pub fn new(
        store: Arc<PlaceStore>,
        generator: Arc<dyn TextGenerator>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            store,
            semantic: None,
            generator,
            settings,
        }
    }

    pub fn with_semantic(mut self, engine: SemanticEngine) -> Self {
        self.semantic = Some(engine);
        self
    }

    pub fn store(&self) -> &PlaceStore {
        &self.store
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats::collect(self.store.places())
    }

    /// Keyword-path query. Never fails; errors become failure responses.
    pub async fn answer(&self, request: &QueryRequest) -> QueryResponse {
        respond(&request.query, self.suggest(request).await)
    }

    /// Semantic-path query with the same response contract as [`answer`](Self::answer).
    pub async fn answer_semantic(&self, request: &QueryRequest) -> QueryResponse {
        respond(&request.query, self.semantic_answer(request).await)
    }

    /// Extract intent, rank the dataset, cut to the effective limit and
    /// compose a reply.
    pub async fn suggest(&self, request: &QueryRequest) -> Result<TourAnswer> {
        let query = validate(request)?;
        let intent = extract(query);
        let ranked = rank(self.store.places(), &intent);

        if ranked.is_empty() {
            if intent.location_type == LocationType::Unknown && self.can_fall_back() {
                info!(query, "no keyword match, falling back to semantic search");
                let k = effective_limit(request.top_k, intent.requested_count);
                return self.semantic_with_intent(query, k, intent).await;
            }
            return Err(TourError::NoMatchFound);
        }

        let limit = effective_limit(request.top_k, intent.requested_count);
        let suggestions: Vec<PlaceRecord> = ranked.into_iter().take(limit).collect();
        self.finish(query, intent, suggestions).await
    }

    /// Embed the query, take the nearest places and compose a reply.
    pub async fn semantic_answer(&self, request: &QueryRequest) -> Result<TourAnswer> {
        let query = validate(request)?;
        let k = effective_limit(request.top_k, self.settings.semantic_top_k);
        self.semantic_with_intent(query, k, extract(query)).await
    }

    fn can_fall_back(&self) -> bool {
        self.settings.semantic_fallback
            && self.semantic.as_ref().is_some_and(SemanticEngine::has_index)
    }

    async fn semantic_with_intent(
        &self,
        query: &str,
        k: usize,
        intent: QueryIntent,
    ) -> Result<TourAnswer> {
        let engine = self
            .semantic
            .as_ref()
            .ok_or_else(|| TourError::IndexUnavailable("semantic search is not configured".to_string()))?;

        let hits = engine.search(query, k).await?;
        if hits.is_empty() {
            return Err(TourError::NoMatchFound);
        }

        let suggestions = hits.into_iter().map(|h| h.place).collect();
        self.finish(query, intent, suggestions).await
    }

    async fn finish(
        &self,
        query: &str,
        intent: QueryIntent,
        suggestions: Vec<PlaceRecord>,
    ) -> Result<TourAnswer> {
        let ai_message = compose(query, &suggestions, &intent, self.generator.as_ref()).await?;

        info!(
            query,
            location = %intent.location,
            location_type = %intent.location_type,
            count = suggestions.len(),
            "answered tour query"
        );

        Ok(TourAnswer {
            success: true,
            query: query.to_string(),
            location: intent.location,
            location_type: intent.location_type,
            count: suggestions.len(),
            suggestions,
            ai_message,
        })
    }
}

/// `top_k` wins when positive, otherwise the fallback count.
fn effective_limit(top_k: Option<usize>, fallback: usize) -> usize {
    top_k.filter(|k| *k > 0).unwrap_or(fallback)
}

fn validate(request: &QueryRequest) -> Result<&str> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(TourError::InvalidRequest("Query is required".to_string()));
    }
    Ok(query)
}

fn respond(query: &str, result: Result<TourAnswer>) -> QueryResponse {
    match result {
        Ok(answer) => QueryResponse::Success(answer),
        Err(e) => {
            if e.is_fault() {
                warn!(query, error = %e, "tour query failed");
            } else {
                info!(query, reason = %e, "tour query not answered");
            }
            QueryResponse::failure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::place::Division;
    use crate::search::embedding::LocalEmbedder;
    use crate::search::engine::embed_places;
    use async_trait::async_trait;

    struct Canned;

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok("  Assalamu alaikum!  ".to_string())
        }
    }

    struct Unavailable;

    #[async_trait]
    impl TextGenerator for Unavailable {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(TourError::GenerationService("503 Service Unavailable".to_string()))
        }
    }

    fn places() -> Vec<PlaceRecord> {
        vec![
            PlaceRecord::new("Jaflong", Division::Sylhet)
                .with_description("Stone collection and clear river water near the border"),
            PlaceRecord::new("Lalbagh Fort", Division::Dhaka)
                .with_description("An incomplete Mughal fort complex"),
            PlaceRecord::new("Madhabkunda Waterfall", Division::Sylhet),
            PlaceRecord::new("Ratargul Swamp Forest", Division::Sylhet)
                .with_description("Freshwater swamp forest"),
            PlaceRecord::new("Cox's Bazar", Division::Chittagong)
                .with_description("The longest natural sea beach in the world"),
            PlaceRecord::new("Sundarbans", Division::Khulna)
                .with_description("Mangrove forest and home of the Bengal tiger"),
        ]
    }

    fn guide_with(generator: Arc<dyn TextGenerator>, settings: SearchSettings) -> TourGuide {
        TourGuide::new(Arc::new(PlaceStore::from_places(places())), generator, settings)
    }

    fn guide() -> TourGuide {
        guide_with(Arc::new(Canned), SearchSettings::default())
    }

    async fn with_index(guide: TourGuide) -> anyhow::Result<TourGuide> {
        let provider = Arc::new(LocalEmbedder::with_dimension(64));
        let (index, _) = embed_places(guide.store().places(), provider.as_ref(), 10).await?;
        Ok(guide.with_semantic(SemanticEngine::new(provider).with_index(index)))
    }

    #[tokio::test]
    async fn test_division_query() -> anyhow::Result<()> {
        let response = guide().answer(&QueryRequest::new("top 2 spots in Sylhet")).await;
        let answer = response.answer().ok_or_else(|| anyhow::anyhow!("expected success"))?;

        assert!(answer.success);
        assert_eq!(answer.location, "sylhet");
        assert_eq!(answer.location_type, LocationType::Division);
        assert_eq!(answer.count, 2);
        assert_eq!(answer.suggestions.len(), 2);
        assert!(answer.suggestions.iter().all(|p| p.division == Division::Sylhet));
        assert_eq!(answer.ai_message, "Assalamu alaikum!");
        Ok(())
    }

    #[tokio::test]
    async fn test_top_k_overrides_parsed_count() -> anyhow::Result<()> {
        let request = QueryRequest::new("top 2 spots in Sylhet").with_top_k(3);
        let answer = guide().suggest(&request).await?;
        assert_eq!(answer.count, 3);

        let request = QueryRequest::new("top 2 spots in Sylhet").with_top_k(0);
        let answer = guide().suggest(&request).await?;
        assert_eq!(answer.count, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_landmark_query_ranks_exact_name_first() -> anyhow::Result<()> {
        let answer = guide().suggest(&QueryRequest::new("Cox's Bazar")).await?;
        assert_eq!(answer.location_type, LocationType::Specific);
        assert_eq!(answer.suggestions[0].name, "Cox's Bazar");
        Ok(())
    }

    #[tokio::test]
    async fn test_no_match_failure() {
        let settings = SearchSettings {
            semantic_fallback: false,
            ..SearchSettings::default()
        };
        let response = guide_with(Arc::new(Canned), settings)
            .answer(&QueryRequest::new("rangpur"))
            .await;
        assert!(!response.is_success());
        assert_eq!(response.error(), Some("No matching tourist places found."));
    }

    #[tokio::test]
    async fn test_unknown_without_index_is_no_match() {
        let err = guide()
            .suggest(&QueryRequest::new("somewhere quiet"))
            .await
            .unwrap_err();
        assert!(matches!(err, TourError::NoMatchFound));
    }

    #[tokio::test]
    async fn test_unknown_falls_back_to_semantic() -> anyhow::Result<()> {
        let guide = with_index(guide()).await?;
        let answer = guide
            .suggest(&QueryRequest::new("mangrove forest tiger"))
            .await?;

        assert_eq!(answer.location_type, LocationType::Unknown);
        assert_eq!(answer.location, "mangrove forest tiger");
        assert_eq!(answer.count, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_fallback_keeps_query_count() -> anyhow::Result<()> {
        let guide = with_index(guide()).await?;
        let answer = guide
            .suggest(&QueryRequest::new("top 2 mangrove forests"))
            .await?;

        assert_eq!(answer.location_type, LocationType::Unknown);
        assert_eq!(answer.count, 2);

        let request = QueryRequest::new("top 2 mangrove forests").with_top_k(4);
        let answer = guide.suggest(&request).await?;
        assert_eq!(answer.count, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let response = guide().answer(&QueryRequest::new("   ")).await;
        assert_eq!(response.error(), Some("Invalid request: Query is required"));
    }

    #[tokio::test]
    async fn test_generation_failure_is_structured() {
        let response = guide_with(Arc::new(Unavailable), SearchSettings::default())
            .answer(&QueryRequest::new("sylhet"))
            .await;
        let error = response.error().unwrap_or_default();
        assert!(error.contains("503 Service Unavailable"));
    }

    #[tokio::test]
    async fn test_semantic_answer() -> anyhow::Result<()> {
        let guide = with_index(guide()).await?;
        let request = QueryRequest::new("Freshwater swamp forest").with_top_k(2);
        let answer = guide.semantic_answer(&request).await?;

        assert_eq!(answer.count, 2);
        assert_eq!(answer.suggestions[0].name, "Ratargul Swamp Forest");
        Ok(())
    }

    #[tokio::test]
    async fn test_semantic_without_index() {
        let response = guide().answer_semantic(&QueryRequest::new("beach")).await;
        let error = response.error().unwrap_or_default();
        assert!(error.starts_with("Vector index unavailable"));
    }

    #[test]
    fn test_stats() {
        let stats = guide().stats();
        assert_eq!(stats.total_places, 6);
        assert_eq!(stats.by_division.get("Sylhet"), Some(&3));
        assert_eq!(stats.places_with_descriptions, 5);
    }
}
