use anyhow::{Context, Result};
use cinedate_api::{api, app::App, models::Config};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "cinedate-api")]
#[command(about = "Serve the Letterboxd dating profile API")]
struct CliArgs {
    /// Address to listen on; overrides BIND_ADDRESS.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinedate_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cinedate-api");

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app = match App::from_config(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let address = args.bind.unwrap_or_else(|| config.bind_address.clone());
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    api::serve(listener, app).await?;
    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::Parser;

    #[test]
    fn test_cli_bind_override() {
        let args = CliArgs::parse_from(["cinedate-api", "--bind", "127.0.0.1:8080"]);
        assert_eq!(args.bind.as_deref(), Some("127.0.0.1:8080"));
    }

    #[test]
    fn test_cli_defaults_to_config_address() {
        let args = CliArgs::parse_from(["cinedate-api"]);
        assert!(args.bind.is_none());
    }
}
