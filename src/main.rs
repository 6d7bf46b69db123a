//! AITA - AI teaching assistant client
//!
#![doc = "AITA - AI teaching assistant client"]
#![doc = "Main entry point for the AITA command-line client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aita::account::AuthState;
use aita::cli::{Cli, Commands};
use aita::commands;
use aita::config::Config;
use aita::credentials::CredentialStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Login { email, password } => {
            tracing::info!("Signing in as {}", email);
            commands::auth::login(config, email, password).await?;
            Ok(())
        }
        Commands::Signup {
            email,
            password,
            role,
        } => {
            tracing::info!("Creating {} account for {}", role, email);
            commands::auth::signup(config, email, password, role).await?;
            Ok(())
        }
        Commands::Logout => {
            commands::auth::logout(config)?;
            Ok(())
        }
        Commands::Whoami => {
            let auth = load_auth_state(&config);
            commands::auth::whoami(&auth);
            Ok(())
        }
        Commands::Chat { course } => {
            tracing::info!("Starting interactive chat");
            if let Some(c) = &course {
                tracing::debug!("Grounding session in course {}", c);
            }
            let auth = load_auth_state(&config);
            commands::chat::run_chat(config, auth, course).await?;
            Ok(())
        }
        Commands::Ask { course, question } => {
            let auth = load_auth_state(&config);
            commands::ask::run_ask(config, auth, course, question).await?;
            Ok(())
        }
    }
}

/// Reads the stored session; an unavailable keyring counts as signed out
fn load_auth_state(config: &Config) -> AuthState {
    match CredentialStore::new(&config.credentials).load() {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!("Could not read stored credentials: {}", e);
            AuthState::Anonymous
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so answers printed by `ask` stay clean on stdout.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "aita=debug" } else { "aita=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
