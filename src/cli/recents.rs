use super::{CommandContext, OutputFormat, StreamRow, format_millis, print_streams};
use anyhow::Result;

pub enum RecentsCommand {
    List { format: OutputFormat },
    Clear,
}

impl RecentsCommand {
    pub async fn execute(self, context: &mut CommandContext) -> Result<()> {
        match self {
            Self::List { format } => {
                let rows: Vec<StreamRow> = context
                    .library
                    .recents()
                    .entries()
                    .iter()
                    .map(|r| StreamRow {
                        id: r.id.clone(),
                        name: r.name.clone(),
                        stream_url: r.stream_url.clone(),
                        logo_url: r.logo_url.clone(),
                        at: Some(format_millis(r.watched_at)),
                    })
                    .collect();
                print_streams(&rows, format, "Nothing watched yet.")?;
            }
            Self::Clear => {
                let count = context.library.recents().len();
                context.library.recents_mut().clear_recents();
                println!("Cleared {} recently watched channel(s)", count);
            }
        }

        Ok(())
    }
}
