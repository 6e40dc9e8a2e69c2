// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wallet session routes.
//!
//! The dashboard connects a browser wallet and exchanges the address for
//! a JWT session cookie. Connecting counts as opening the app for the
//! day, so it also triggers a streak evaluation.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::badge::badge_by_id;
use crate::models::{User, WalletAddress};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/connect", post(connect))
        .route("/auth/disconnect", post(disconnect))
}

/// Connect request body.
#[derive(Deserialize)]
struct ConnectRequest {
    wallet: String,
}

/// A badge earned during this connect's evaluation.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NewBadgeNotice {
    pub badge_id: String,
    pub name: String,
    pub emoji: String,
}

/// Connect response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ConnectResponse {
    pub wallet: String,
    /// Session token (also set as an HttpOnly cookie)
    pub token: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub new_badges: Vec<NewBadgeNotice>,
}

/// Connect a wallet: validate the address, record the profile, mark the
/// app opened, evaluate today, and issue a session.
async fn connect(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<ConnectRequest>,
) -> Result<(CookieJar, Json<ConnectResponse>)> {
    let wallet = WalletAddress::parse(&req.wallet)
        .map_err(|e| AppError::BadRequest(format!("Invalid wallet address: {}", e)))?;

    let now = format_utc_rfc3339(chrono::Utc::now());

    // Upsert profile, preserving the original connect time
    let user = match state.db.get_user(wallet.as_str()).await? {
        Some(mut existing) => {
            existing.last_active = now;
            existing
        }
        None => {
            tracing::info!(wallet = %wallet, "First connection for wallet");
            User {
                wallet: wallet.as_str().to_string(),
                created_at: now.clone(),
                last_active: now,
            }
        }
    };
    state.db.upsert_user(&user).await?;

    // Connect trigger: mark opened + evaluate today
    let evaluation = state.streak_service.process_connect(wallet.as_str()).await?;

    let new_badges = evaluation
        .newly_earned
        .iter()
        .filter_map(|earned| badge_by_id(&earned.badge_id))
        .map(|badge| NewBadgeNotice {
            badge_id: badge.id.to_string(),
            name: badge.name.to_string(),
            emoji: badge.emoji.to_string(),
        })
        .collect();

    let token = create_jwt(&wallet, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let jar = jar.add(session_cookie(
        token.clone(),
        &state.config.frontend_url,
    ));

    tracing::info!(
        wallet = %wallet,
        current_streak = evaluation.state.current_streak,
        "Wallet connected"
    );

    Ok((
        jar,
        Json(ConnectResponse {
            wallet: wallet.as_str().to_string(),
            token,
            current_streak: evaluation.state.current_streak,
            longest_streak: evaluation.state.longest_streak,
            new_badges,
        }),
    ))
}

/// Disconnect: clear the session cookie.
///
/// A pending evaluation for the old wallet is simply never applied to
/// the next one; state is keyed by the wallet in the session.
async fn disconnect(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(time::Duration::ZERO);

    (jar.add(removal), StatusCode::NO_CONTENT)
}

/// Build the session cookie; `Secure` only off localhost so local dev
/// over plain HTTP keeps working.
fn session_cookie(token: String, frontend_url: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::days(30));
    if !frontend_url.contains("localhost") && !frontend_url.contains("127.0.0.1") {
        cookie.set_secure(true);
    }
    cookie
}
