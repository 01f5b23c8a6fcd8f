use anyhow::Result;
use serde_json::json;

use livetv::model::Channel;
use livetv::screen::{CategoryScreen, LoadState};
use livetv::{Config, FirestoreCatalog, Library};

pub mod browse;
pub mod favorites;
pub mod play;
pub mod recents;

pub use browse::BrowseCommand;
pub use favorites::FavoritesCommand;
pub use play::PlayCommand;
pub use recents::RecentsCommand;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
    M3u,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "m3u" => Ok(Self::M3u),
            _ => anyhow::bail!("Invalid format: {}. Use 'text', 'json', or 'm3u'", s),
        }
    }
}

/// Everything a command needs: configuration and the hydrated library.
pub struct CommandContext {
    pub config: Config,
    pub library: Library,
}

impl CommandContext {
    pub async fn open(config: Config) -> Result<Self> {
        let library = Library::open(&config).await?;
        Ok(Self { config, library })
    }

    pub fn catalog(&self) -> Result<FirestoreCatalog> {
        FirestoreCatalog::new(&self.config.catalog)
    }

    /// Look a channel up by id within one category.
    pub async fn find_channel(&self, slug: &str, channel_id: &str) -> Result<Channel> {
        let catalog = self.catalog()?;
        let mut screen = CategoryScreen::new(slug);
        screen.mount(&catalog).await;

        if let LoadState::Failed(message) = screen.state() {
            anyhow::bail!("{}", message);
        }

        screen
            .find(channel_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Channel {} not found in {}", channel_id, slug))
    }

    /// Flush pending writes before the process exits.
    pub async fn finish(self) {
        self.library.close().await;
    }
}

/// Print `{id, name, streamUrl, logoUrl}` style rows in the requested format.
pub fn print_streams(rows: &[StreamRow], format: OutputFormat, empty_message: &str) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let values: Vec<_> = rows
                .iter()
                .map(|r| {
                    json!({
                        "id": r.id,
                        "name": r.name,
                        "streamUrl": r.stream_url,
                        "logoUrl": r.logo_url,
                        "at": r.at,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("{}", empty_message);
            }
            for row in rows {
                match &row.at {
                    Some(at) => println!("{:>12} | {} ({})", row.id, row.name, at),
                    None => println!("{:>12} | {}", row.id, row.name),
                }
            }
        }
        OutputFormat::M3u => {
            println!("#EXTM3U");
            for row in rows {
                match &row.logo_url {
                    Some(logo) => println!(
                        "#EXTINF:-1 tvg-id=\"{}\" tvg-logo=\"{}\",{}",
                        row.id, logo, row.name
                    ),
                    None => println!("#EXTINF:-1 tvg-id=\"{}\",{}", row.id, row.name),
                }
                println!("{}", row.stream_url);
            }
        }
    }
    Ok(())
}

/// One printable stream: a catalog channel or a library entry.
pub struct StreamRow {
    pub id: String,
    pub name: String,
    pub stream_url: String,
    pub logo_url: Option<String>,
    pub at: Option<String>,
}

/// Render an epoch-millisecond stamp in local time.
pub fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| millis.to_string())
}
