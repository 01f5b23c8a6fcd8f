use super::{CommandContext, OutputFormat, StreamRow, format_millis, print_streams};
use anyhow::Result;
use livetv::screen::{NO_FAVORITES, favorites_view};

pub enum FavoritesCommand {
    List { format: OutputFormat },
    Add { slug: String, id: String },
    Remove { id: String },
    Toggle { slug: String, id: String },
}

impl FavoritesCommand {
    pub async fn execute(self, context: &mut CommandContext) -> Result<()> {
        match self {
            Self::List { format } => {
                let rows: Vec<StreamRow> = favorites_view(context.library.favorites())
                    .into_iter()
                    .map(|f| StreamRow {
                        at: Some(format_millis(f.added_at)),
                        id: f.id,
                        name: f.name,
                        stream_url: f.stream_url,
                        logo_url: f.logo_url,
                    })
                    .collect();
                print_streams(&rows, format, NO_FAVORITES)?;
            }
            Self::Add { slug, id } => {
                let channel = context.find_channel(&slug, &id).await?;
                context.library.favorites_mut().add(&channel);
                println!("Added '{}' to favorites", channel.name);
            }
            Self::Remove { id } => {
                let favorites = context.library.favorites();
                let name = favorites
                    .entries()
                    .iter()
                    .find(|f| f.id == id)
                    .map(|f| f.name.clone())
                    .ok_or_else(|| anyhow::anyhow!("Favorite {} not found", id))?;

                context.library.favorites_mut().remove(&id);
                println!("Removed '{}' from favorites", name);
            }
            Self::Toggle { slug, id } => {
                let channel = context.find_channel(&slug, &id).await?;
                if context.library.favorites_mut().toggle(&channel) {
                    println!("Added '{}' to favorites", channel.name);
                } else {
                    println!("Removed '{}' from favorites", channel.name);
                }
            }
        }

        Ok(())
    }
}
