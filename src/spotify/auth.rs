use std::{sync::Arc, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Url, header::AUTHORIZATION};
use tokio::sync::Mutex;

use crate::{
    Error, Res,
    config::{self, Config, Credentials},
    management::TokenManager,
    server::start_api_server,
    spotify::error_for_status,
    storage::ObjectStore,
    success,
    types::{AuthState, Token, TokenResponse},
    utils, warning,
};

/// Seeds the token cache of `user_id` through the authorization code flow.
///
/// Scheduled runs never authenticate interactively; a user without a token
/// cache is skipped. This function is the out-of-band step that creates the
/// cache:
///
/// 1. Starts the local callback server on `config.server_addr`
/// 2. Opens the Spotify authorize URL in the browser (or prints it)
/// 3. Waits up to 60 seconds for the callback to exchange the code
/// 4. Writes the token to `.cache-{user_id}` in the configured store
///
/// The redirect URL registered for the user's Spotify application must point
/// at `http://<server_addr>/callback`.
///
/// # Errors
///
/// Fails if the authorize URL cannot be built, the flow times out, or the
/// token cannot be written to storage.
pub async fn auth(
    config: &Config,
    store: Arc<dyn ObjectStore>,
    user_id: &str,
    credentials: Credentials,
) -> Res<()> {
    let state = utils::generate_state();
    let auth_url = authorize_url(&config.authorize_url, &credentials, &state)?;

    let shared_state = Arc::new(Mutex::new(Some(AuthState {
        state,
        credentials: credentials.clone(),
        token_url: config.token_url.clone(),
        token: None,
    })));

    let server_state = Arc::clone(&shared_state);
    let server_addr = config.server_addr.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = start_api_server(&server_addr, server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(shared_state).await;
    server.abort();

    let token = token.ok_or_else(|| Error::Auth("authentication failed or timed out".to_string()))?;

    let token_manager = TokenManager::new(
        token,
        credentials,
        store,
        config.bucket.clone(),
        TokenManager::cache_key(user_id),
        config.token_url.clone(),
    );
    token_manager.persist().await?;

    success!("Authentication for {} successful!", user_id);
    Ok(())
}

/// Polls the shared state until the callback handler stored a token, for at
/// most 60 seconds.
async fn wait_for_token(shared_state: Arc<Mutex<Option<AuthState>>>) -> Option<Token> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for Spotify authorization...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|s| s.token.clone()) {
            pb.finish_and_clear();
            return Some(token);
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    pb.finish_and_clear();
    None
}

/// Builds the URL the user visits to grant topsync access.
pub fn authorize_url(base: &str, credentials: &Credentials, state: &str) -> Res<String> {
    let url = Url::parse_with_params(
        base,
        &[
            ("client_id", credentials.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", credentials.redirect_url.as_str()),
            ("state", state),
            ("scope", config::SPOTIFY_SCOPE),
            ("show_dialog", "true"),
        ],
    )
    .map_err(|e| Error::Config(format!("invalid authorize url {base}: {e}")))?;

    Ok(url.to_string())
}

/// Exchanges an authorization code for a token.
///
/// # Errors
///
/// Network failures, a non-success response, or a response without a
/// refresh token.
pub async fn exchange_code(
    client: &Client,
    token_url: &str,
    credentials: &Credentials,
    code: &str,
) -> Res<Token> {
    let res = client
        .post(token_url)
        .header(AUTHORIZATION, basic_auth(credentials))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", credentials.redirect_url.as_str()),
        ])
        .send()
        .await?;

    let body: TokenResponse = error_for_status(res).await?.json().await?;
    token_from_response(body, None)
}

/// Exchanges a refresh token for a fresh access token.
///
/// Spotify may or may not rotate the refresh token; when the response has
/// none, the previous one is kept.
pub async fn refresh_token(
    client: &Client,
    token_url: &str,
    credentials: &Credentials,
    refresh_token: &str,
) -> Res<Token> {
    let res = client
        .post(token_url)
        .header(AUTHORIZATION, basic_auth(credentials))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?;

    let body: TokenResponse = error_for_status(res).await?.json().await?;
    token_from_response(body, Some(refresh_token))
}

pub fn token_from_response(body: TokenResponse, previous_refresh_token: Option<&str>) -> Res<Token> {
    let refresh_token = body
        .refresh_token
        .or_else(|| previous_refresh_token.map(str::to_string))
        .ok_or_else(|| Error::Auth("token response carries no refresh token".to_string()))?;

    Ok(Token {
        access_token: body.access_token,
        token_type: body.token_type,
        expires_in: body.expires_in,
        scope: body.scope.unwrap_or_default(),
        expires_at: Utc::now().timestamp() + body.expires_in as i64,
        refresh_token,
    })
}

fn basic_auth(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.client_id, credentials.client_secret);
    format!("Basic {}", STANDARD.encode(raw))
}
