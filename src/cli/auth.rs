use crate::{
    config::{self, Config, CredentialSource, EnvCredentials},
    error, spotify, storage,
};

pub async fn auth(config: Config, user_id: String) {
    let Some(credentials) = EnvCredentials.credentials(&user_id) else {
        error!(
            "Missing credentials for {}. Set {}, {} and {}.",
            user_id,
            config::client_id_var(&user_id),
            config::client_secret_var(&user_id),
            config::redirect_url_var(&user_id)
        );
    };

    let store = match storage::open(&config).await {
        Ok(store) => store,
        Err(e) => error!("Cannot open storage: {}", e),
    };

    if let Err(e) = spotify::auth::auth(&config, store, &user_id, credentials).await {
        error!("Authentication failed: {}", e);
    }
}
