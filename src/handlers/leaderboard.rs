use actix_web::{
    web::{Data, Json, Path},
    HttpResponse, Responder,
};

use crate::config::AppState;
use crate::error::ApiError;
use crate::handlers::now_unix_ms;
use crate::store::NewScore;
use crate::types::{LeaderboardEntryDto, SubmitResponse, SubmitScoreRequest, TopResponse};

pub(crate) async fn top100(state: Data<AppState>) -> impl Responder {
    match state.store.top(state.policy.top_limit) {
        Ok(entries) => HttpResponse::Ok().json(TopResponse {
            entries: entries.into_iter().map(Into::into).collect(),
            last_updated: now_unix_ms(),
        }),
        Err(err) => ApiError::from(err).into_response(),
    }
}

pub(crate) async fn submit(state: Data<AppState>, req: Json<SubmitScoreRequest>) -> impl Responder {
    match handle_submit(&state, req.into_inner()) {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

fn handle_submit(state: &AppState, req: SubmitScoreRequest) -> Result<HttpResponse, ApiError> {
    let (Some(user_id), Some(player_name), Some(score)) =
        (req.user_id, req.player_name, req.score)
    else {
        return Err(ApiError::InvalidInput("Missing required fields".to_string()));
    };

    if score < 0 {
        return Err(ApiError::InvalidInput("Invalid score value".to_string()));
    }
    if score > state.policy.max_score {
        return Err(ApiError::InvalidInput(
            "Score exceeds maximum possible value".to_string(),
        ));
    }

    // The ledger keys linkage on the lowercase wallet form.
    let wallet = req.wallet_address.map(|w| w.to_ascii_lowercase());

    let outcome = state.store.submit_score(&NewScore {
        user_id: &user_id,
        player_name: &player_name,
        score,
        max_combo: req.max_combo,
        time_survived: req.time_survived,
        total_bounces: req.total_bounces,
        wallet_address: wallet.as_deref(),
        nft_skin_id: req.nft_skin_id.as_deref(),
        is_verified: req.is_verified,
    })?;

    if outcome.applied {
        tracing::info!(%user_id, score, rank = outcome.rank, "score accepted");
    } else {
        tracing::debug!(
            %user_id,
            score,
            best_score = outcome.best_score,
            "score below stored best, kept out"
        );
    }

    Ok(HttpResponse::Ok().json(SubmitResponse {
        success: true,
        new_rank: outcome.rank,
        message: format!("Score submitted successfully! Rank: #{}", outcome.rank),
    }))
}

pub(crate) async fn player(state: Data<AppState>, path: Path<String>) -> impl Responder {
    let user_id = path.into_inner();
    match state.store.player(&user_id) {
        Ok(Some(entry)) => HttpResponse::Ok().json(LeaderboardEntryDto::from(entry)),
        Ok(None) => ApiError::NotFound("Player not found".to_string()).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}
