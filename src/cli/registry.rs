use tabled::{Table, settings::Style};

use crate::{config::Config, error, info, management::RegistryManager, storage, warning};

/// Prints the recorded playlist URIs, optionally for a single user.
pub async fn registry(config: Config, user: Option<String>) {
    let store = match storage::open(&config).await {
        Ok(store) => store,
        Err(e) => error!("Cannot open storage: {}", e),
    };

    let registry =
        match RegistryManager::load(store.as_ref(), &config.bucket, &config.registry_key).await {
            Ok(registry) => registry,
            Err(e) => error!("Failed to load registry: {}", e),
        };

    let rows: Vec<_> = registry
        .table_rows()
        .into_iter()
        .filter(|row| user.as_ref().is_none_or(|u| &row.user == u))
        .collect();

    if rows.is_empty() {
        warning!("No playlists recorded.");
        return;
    }

    info!("{} users in registry.", registry.count_users());
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
