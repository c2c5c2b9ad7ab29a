use actix_web::{
    web::{Data, Json, Path},
    HttpResponse, Responder,
};

use crate::challenge;
use crate::config::AppState;
use crate::error::ApiError;
use crate::signature::{is_wallet_address, verify_wallet_signature};
use crate::types::{
    CheckWalletResponse, CreateAccountRequest, CreateAccountResponse, SignInRequest,
    SignInResponse, UpdateUsernameRequest, UpdateUsernameResponse,
};
use crate::username::validate_username;

const MISSING_FIELDS: &str = "Missing required fields";
const BAD_WALLET: &str = "Invalid wallet address format";

/// The auth gate: freshness first, then signature recovery. Both fail closed
/// into `Unauthorized`; the verifier itself never errors past its boundary.
fn verify_signed_request(wallet: &str, message: &str, sig: &str) -> Result<(), ApiError> {
    if let Err(err) = challenge::check_freshness(message) {
        tracing::info!(wallet, "freshness check failed: {err}");
        return Err(ApiError::Unauthorized(
            "Signature expired. Please try again.".to_string(),
        ));
    }
    if !verify_wallet_signature(wallet, message, sig) {
        tracing::info!(wallet, "signature verification failed");
        return Err(ApiError::Unauthorized("Invalid signature".to_string()));
    }
    Ok(())
}

pub(crate) async fn create_account(
    state: Data<AppState>,
    req: Json<CreateAccountRequest>,
) -> impl Responder {
    match handle_create_account(&state, req.into_inner()) {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

fn handle_create_account(
    state: &AppState,
    req: CreateAccountRequest,
) -> Result<HttpResponse, ApiError> {
    let (Some(wallet), Some(username), Some(sig), Some(message)) =
        (req.wallet_address, req.username, req.signature, req.message)
    else {
        return Err(ApiError::InvalidInput(MISSING_FIELDS.to_string()));
    };

    if !is_wallet_address(&wallet) {
        return Err(ApiError::InvalidInput(BAD_WALLET.to_string()));
    }
    validate_username(&username).map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    if req.is_development_mode {
        // The bypass is gated server-side; a request flag alone never
        // disables verification.
        if !state.policy.allow_dev_mode_requests {
            return Err(ApiError::InvalidInput(
                "Development mode is disabled by server policy".to_string(),
            ));
        }
        tracing::warn!(%wallet, "dev mode: skipping signature verification");
    } else {
        verify_signed_request(&wallet, &message, &sig)?;
    }

    let account = state.store.create_account(&wallet, &username)?;
    tracing::info!(
        username = %account.username,
        wallet = %account.wallet_address,
        "account created"
    );

    Ok(HttpResponse::Ok().json(CreateAccountResponse {
        success: true,
        user_id: account.id,
        username: account.username,
        player_name: account.player_name,
        wallet_address: account.wallet_address,
    }))
}

pub(crate) async fn check_wallet(state: Data<AppState>, path: Path<String>) -> impl Responder {
    match handle_check_wallet(&state, &path.into_inner()) {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

fn handle_check_wallet(state: &AppState, wallet: &str) -> Result<HttpResponse, ApiError> {
    if !is_wallet_address(wallet) {
        return Err(ApiError::InvalidInput(BAD_WALLET.to_string()));
    }

    let body = match state.store.account_by_wallet(wallet)? {
        Some(account) => CheckWalletResponse::found(account),
        None => CheckWalletResponse::absent(),
    };
    Ok(HttpResponse::Ok().json(body))
}

pub(crate) async fn sign_in(state: Data<AppState>, req: Json<SignInRequest>) -> impl Responder {
    match handle_sign_in(&state, req.into_inner()) {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

fn handle_sign_in(state: &AppState, req: SignInRequest) -> Result<HttpResponse, ApiError> {
    let (Some(wallet), Some(sig), Some(message)) = (req.wallet_address, req.signature, req.message)
    else {
        return Err(ApiError::InvalidInput(MISSING_FIELDS.to_string()));
    };

    // No dev bypass here: sign-in always proves key ownership.
    verify_signed_request(&wallet, &message, &sig)?;

    let account = state
        .store
        .account_by_wallet(&wallet)?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    let stats = state.store.best_stats_by_wallet(&account.wallet_address)?;

    tracing::info!(
        username = %account.username,
        wallet = %account.wallet_address,
        "user signed in"
    );

    Ok(HttpResponse::Ok().json(SignInResponse {
        success: true,
        user_id: account.id,
        username: account.username,
        player_name: account.player_name,
        wallet_address: account.wallet_address,
        is_verified: account.is_verified,
        stats: stats.map(Into::into),
    }))
}

pub(crate) async fn update_username(
    state: Data<AppState>,
    req: Json<UpdateUsernameRequest>,
) -> impl Responder {
    match handle_update_username(&state, req.into_inner()) {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

fn handle_update_username(
    state: &AppState,
    req: UpdateUsernameRequest,
) -> Result<HttpResponse, ApiError> {
    let (Some(wallet), Some(new_username), Some(sig), Some(message)) = (
        req.wallet_address,
        req.new_username,
        req.signature,
        req.message,
    ) else {
        return Err(ApiError::InvalidInput(MISSING_FIELDS.to_string()));
    };

    validate_username(&new_username).map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    verify_signed_request(&wallet, &message, &sig)?;

    let account = state
        .store
        .rename_account(&wallet, &new_username)?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    tracing::info!(wallet = %account.wallet_address, username = %account.username, "username updated");

    Ok(HttpResponse::Ok().json(UpdateUsernameResponse {
        success: true,
        username: account.username,
        player_name: account.player_name,
    }))
}
