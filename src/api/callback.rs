use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{spotify, types::AuthState, warning};

/// Receives the redirect from Spotify's authorize page and exchanges the
/// code for a token, which is left in the shared state for the waiting
/// `auth` flow.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<AuthState>>>>,
) -> Html<&'static str> {
    if let Some(reason) = params.get("error") {
        warning!("Authorization was denied: {}", reason);
        return Html("<h4>Authorization denied.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    // not held across the token exchange
    let (credentials, token_url) = {
        let state = shared_state.lock().await;
        let Some(auth_state) = state.as_ref() else {
            return Html("<h4>No authorization in progress.</h4>");
        };

        if params.get("state") != Some(&auth_state.state) {
            warning!("Callback state does not match the authorize request.");
            return Html("<h4>State mismatch.</h4>");
        }
        (auth_state.credentials.clone(), auth_state.token_url.clone())
    };

    let client = Client::new();
    match spotify::auth::exchange_code(&client, &token_url, &credentials, code).await {
        Ok(token) => {
            let mut state = shared_state.lock().await;
            let Some(auth_state) = state.as_mut() else {
                return Html("<h4>No authorization in progress.</h4>");
            };
            auth_state.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
