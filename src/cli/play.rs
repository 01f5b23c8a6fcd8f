use super::CommandContext;
use anyhow::Result;
use livetv::Player;
use livetv::player::PlaybackEvent;
use livetv::screen::PlayerScreen;
use tokio::sync::mpsc;

pub struct PlayCommand {
    pub slug: String,
    pub id: String,
}

impl PlayCommand {
    pub async fn execute(self, context: &mut CommandContext) -> Result<()> {
        let channel = context.find_channel(&self.slug, &self.id).await?;
        let player = Player::new(context.config.player.clone());
        if !player.is_available() {
            tracing::warn!(
                "'{}' did not answer --version; trying anyway",
                context.config.player.command
            );
        }

        let mut screen = PlayerScreen::open(channel, &mut context.library);
        // Playback can run for hours; make the watch durable first.
        context.library.flush().await;

        let favorite = if screen.is_favorite(&context.library) {
            " ★"
        } else {
            ""
        };
        eprintln!("{}{}", screen.channel().name, favorite);

        let url = screen.channel().stream_url.clone();
        let (tx, mut rx) = mpsc::unbounded_channel::<PlaybackEvent>();

        let surface = async {
            while let Some(event) = rx.recv().await {
                screen.surface_mut().handle(&event);
                eprintln!("{}", screen.surface().status_line());
            }
        };
        tokio::join!(player.play(&url, tx), surface);

        if let Some(message) = screen.surface().error() {
            anyhow::bail!("{}", message);
        }

        Ok(())
    }
}
