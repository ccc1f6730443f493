use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cycle::{self, Phase};
use crate::error::{ApiError, ApiResult};
use crate::recommendation::{recommend, Recommendation};
use super::{today, AppState};

#[derive(Deserialize)]
pub struct RecommendationRequest {
    pub user_input: String,
    /// Taken from the user's profile when absent.
    pub current_phase: Option<Phase>,
    pub user_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub recommendation: GeneratedRecommendation,
}

#[derive(Serialize)]
pub struct GeneratedRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub user_input: String,
    pub timestamp: DateTime<Utc>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/recommendations", post(create_recommendation))
        .with_state(state)
}

async fn create_recommendation(
    State(state): State<AppState>,
    Json(body): Json<RecommendationRequest>,
) -> ApiResult<Json<RecommendationResponse>> {
    let user_input = body.user_input.trim();
    if user_input.is_empty() {
        return Err(ApiError::bad_request("Missing required field: user_input"));
    }

    let phase = match (body.current_phase, body.user_id) {
        (Some(phase), _) => phase,
        (None, Some(user_id)) => cycle::phase_for_date(today(), &state.profile(user_id).await?),
        (None, None) => Phase::default(),
    };

    let recommendation = recommend(user_input, phase);
    tracing::info!(
        "💡 Recommendation {:?} for {} phase (confidence {:.2})",
        recommendation.concern,
        phase,
        recommendation.confidence
    );

    Ok(Json(RecommendationResponse {
        success: true,
        recommendation: GeneratedRecommendation {
            recommendation,
            user_input: user_input.to_string(),
            timestamp: Utc::now(),
        },
    }))
}
