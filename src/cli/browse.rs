use super::{CommandContext, OutputFormat, StreamRow, print_streams};
use anyhow::Result;
use livetv::screen::{
    CategoryScreen, HomeScreen, LoadState, NO_CATEGORIES, NO_CHANNELS, category_columns,
};
use serde_json::json;

pub enum BrowseCommand {
    Categories { format: OutputFormat },
    Channels { slug: String, format: OutputFormat },
}

impl BrowseCommand {
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let catalog = context.catalog()?;
        let ui = &context.config.ui;

        match self {
            Self::Categories { format } => {
                let mut screen = HomeScreen::new();
                screen.mount(&catalog).await;

                let categories = match screen.state() {
                    LoadState::Ready(categories) => categories,
                    LoadState::Failed(message) => anyhow::bail!("{}", message),
                    LoadState::Loading => return Ok(()),
                };

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&json!(categories))?);
                    }
                    _ => {
                        if categories.is_empty() {
                            println!("{}", NO_CATEGORIES);
                            return Ok(());
                        }
                        let columns = category_columns(ui.device, ui.width);
                        let label = if categories.len() != 1 {
                            "categories"
                        } else {
                            "category"
                        };
                        println!("Browse Categories ({} {})", categories.len(), label);
                        for row in categories.chunks(columns) {
                            let cells: Vec<String> = row
                                .iter()
                                .map(|c| format!("{:<24}", format!("{} [{}]", c.name, c.slug)))
                                .collect();
                            println!("{}", cells.join("  ").trim_end());
                        }
                    }
                }
            }
            Self::Channels { slug, format } => {
                let mut screen = CategoryScreen::new(slug);
                screen.mount(&catalog).await;

                let channels = match screen.state() {
                    LoadState::Ready(channels) => channels,
                    LoadState::Failed(message) => anyhow::bail!("{}", message),
                    LoadState::Loading => return Ok(()),
                };

                let rows: Vec<StreamRow> = channels
                    .iter()
                    .map(|c| StreamRow {
                        id: c.id.clone(),
                        name: c.name.clone(),
                        stream_url: c.stream_url.clone(),
                        logo_url: c.logo_url.clone(),
                        at: None,
                    })
                    .collect();
                print_streams(&rows, format, NO_CHANNELS)?;
            }
        }

        Ok(())
    }
}
