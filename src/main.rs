// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use livetv::Config;

mod cli;
use cli::{
    BrowseCommand, CommandContext, FavoritesCommand, OutputFormat, PlayCommand, RecentsCommand,
};

fn cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser)]
#[command(name = "livetv")]
#[command(about = "Browse live TV channels, keep favorites and recently watched")]
#[command(version)]
#[command(styles = cargo_style())]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging to file (livetv_debug.log)
    #[arg(long, global = true)]
    debug_log: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List channel categories
    Categories {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the channels of one category
    Channels {
        /// Category slug
        slug: String,
        /// Output format (text, json, m3u)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Play a channel and record it as recently watched
    Play {
        /// Category slug
        slug: String,
        /// Channel id
        channel_id: String,
    },

    /// Manage favorite channels
    #[command(subcommand)]
    Favorites(FavoritesSubcommand),

    /// Recently watched channels
    #[command(subcommand)]
    Recents(RecentsSubcommand),

    /// Write a default configuration file
    Init,
}

#[derive(Subcommand)]
enum FavoritesSubcommand {
    /// List favorites, most recently added first
    List {
        /// Output format (text, json, m3u)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Add a channel to favorites
    Add { slug: String, channel_id: String },
    /// Remove a favorite by channel id
    Remove { channel_id: String },
    /// Add the channel if missing, otherwise remove it
    Toggle { slug: String, channel_id: String },
}

#[derive(Subcommand)]
enum RecentsSubcommand {
    /// List recently watched channels, newest first
    List {
        /// Output format (text, json, m3u)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Forget all recently watched channels
    Clear,
}

fn init_logging(cli: &Cli) -> Result<()> {
    if cli.debug_log {
        let file = File::create("livetv_debug.log")?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(
                EnvFilter::from_default_env()
                    .add_directive("livetv=debug".parse()?)
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive(tracing::Level::DEBUG.into())
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("hyper_util=error".parse()?),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    if let Commands::Init = cli.command {
        if config_path.exists() {
            eprintln!("Config already exists at {}", config_path.display());
        } else {
            Config::default().save(&config_path)?;
            println!("Wrote {}", config_path.display());
        }
        return Ok(());
    }

    let config = if cli.config.is_some() {
        Config::load(&config_path)?
    } else if config_path.exists() {
        Config::load_or_default(&config_path)
    } else {
        tracing::debug!("No config at {}, using defaults", config_path.display());
        Config::default()
    };

    let mut context = CommandContext::open(config).await?;

    let result = match cli.command {
        Commands::Categories { format } => {
            let cmd = BrowseCommand::Categories {
                format: OutputFormat::from_str(&format)?,
            };
            cmd.execute(&context).await
        }
        Commands::Channels { slug, format } => {
            let cmd = BrowseCommand::Channels {
                slug,
                format: OutputFormat::from_str(&format)?,
            };
            cmd.execute(&context).await
        }
        Commands::Play { slug, channel_id } => {
            let cmd = PlayCommand {
                slug,
                id: channel_id,
            };
            cmd.execute(&mut context).await
        }
        Commands::Favorites(sub) => {
            let cmd = match sub {
                FavoritesSubcommand::List { format } => FavoritesCommand::List {
                    format: OutputFormat::from_str(&format)?,
                },
                FavoritesSubcommand::Add { slug, channel_id } => FavoritesCommand::Add {
                    slug,
                    id: channel_id,
                },
                FavoritesSubcommand::Remove { channel_id } => {
                    FavoritesCommand::Remove { id: channel_id }
                }
                FavoritesSubcommand::Toggle { slug, channel_id } => FavoritesCommand::Toggle {
                    slug,
                    id: channel_id,
                },
            };
            cmd.execute(&mut context).await
        }
        Commands::Recents(sub) => {
            let cmd = match sub {
                RecentsSubcommand::List { format } => RecentsCommand::List {
                    format: OutputFormat::from_str(&format)?,
                },
                RecentsSubcommand::Clear => RecentsCommand::Clear,
            };
            cmd.execute(&mut context).await
        }
        Commands::Init => Ok(()),
    };

    // Pending writes land even when the command itself failed.
    context.finish().await;
    result
}
