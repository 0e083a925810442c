use std::path::PathBuf;

use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use topsync::{
    cli,
    config::{self, Config, StoreKind},
    error,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Regenerate the playlists of every registered user
    Run,

    /// Authorize a user and store the token cache
    Auth(AuthOptions),

    /// Show the playlists recorded per user
    Registry(RegistryOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

/// Settings that override the environment for this invocation.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Bucket holding users, registry and token caches
    #[clap(long, global = true)]
    pub bucket: Option<String>,

    /// Storage backend
    #[clap(long, global = true, value_parser = ["s3", "fs"])]
    pub store: Option<String>,

    /// Root directory of the filesystem store
    #[clap(long, global = true)]
    pub store_root: Option<PathBuf>,

    /// Key of the user list document
    #[clap(long, global = true)]
    pub users_key: Option<String>,

    /// Key of the playlist registry document
    #[clap(long, global = true)]
    pub registry_key: Option<String>,

    /// Number of top tracks per time range
    #[clap(long, global = true)]
    pub track_count: Option<u32>,

    /// Number of top artists per time range
    #[clap(long, global = true)]
    pub artist_count: Option<u32>,

    /// Market for artist top tracks (ISO 3166-1 alpha-2)
    #[clap(long, global = true)]
    pub market: Option<String>,
}

impl ConfigOverrides {
    fn apply(self, mut config: Config) -> topsync::Res<Config> {
        if let Some(bucket) = self.bucket {
            config.bucket = bucket;
        }
        if let Some(store) = self.store {
            config.store = store.parse::<StoreKind>()?;
        }
        if let Some(root) = self.store_root {
            config.store_root = root;
        }
        if let Some(key) = self.users_key {
            config.users_key = key;
        }
        if let Some(key) = self.registry_key {
            config.registry_key = key;
        }
        if let Some(count) = self.track_count {
            config.top_track_count = count;
        }
        if let Some(count) = self.artist_count {
            config.top_artist_count = count;
        }
        if let Some(market) = self.market {
            config.market = market;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// User identifier as listed in the user list
    #[clap(long)]
    user: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RegistryOptions {
    /// Only show this user
    #[clap(long)]
    user: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let config = match Config::from_env().and_then(|c| cli.overrides.apply(c)) {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    match cli.command {
        Command::Run => cli::run(config).await,
        Command::Auth(opt) => cli::auth(config, opt.user).await,
        Command::Registry(opt) => cli::registry(config, opt.user).await,
        Command::Completions(_) => {}
    }
}
