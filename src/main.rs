mod cli;

use anibridge::{config, server};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "anibridge=trace,tower_http=debug".to_string()
        } else {
            "anibridge=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;
            config.server.host = host;
            config.server.port = port;

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(server::start_server(config))
        }
        Commands::Resolve { id } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(resolve_one(config, id))
        }
        Commands::Episodes { id } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(list_episodes(config, &id))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            match config::load_config_or_default(path.as_deref()) {
                Ok(config) => {
                    println!("Configuration is valid");
                    println!("  server: {}:{}", config.server.host, config.server.port);
                    println!("  static mappings: {}", config.static_mappings.len());
                    Ok(())
                }
                Err(e) => {
                    eprintln!("Configuration is invalid: {e:#}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Version => {
            println!("anibridge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn resolve_one(config: config::Config, external_id: u64) -> Result<()> {
    let ctx = server::AppContext::from_config(config)?;

    match ctx.resolver.resolve(external_id).await {
        Ok(internal_id) => {
            println!(
                "{}",
                serde_json::json!({
                    "externalId": external_id,
                    "internalId": internal_id,
                })
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

async fn list_episodes(config: config::Config, id: &str) -> Result<()> {
    let ctx = server::AppContext::from_config(config)?;

    let (internal_id, known_external) = if id.chars().all(|c| c.is_ascii_digit()) {
        let external_id: u64 = id.parse()?;
        match ctx.resolver.resolve(external_id).await {
            Ok(internal_id) => (internal_id, Some(external_id)),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    } else {
        (id.to_string(), None)
    };

    let collection = ctx.extractor.extract(&internal_id, known_external).await?;
    println!("{}", serde_json::to_string_pretty(&collection)?);
    Ok(())
}
