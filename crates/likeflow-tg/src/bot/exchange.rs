use super::{BotChat, ConversationGuard};
use crate::instagram::ImageBytes;
use crate::prelude::*;
use crate::Result;
use std::time::Duration;

/// Drops whatever the bot was doing in the conversation before
pub(crate) const RESET_COMMAND: &str = "/start";

/// Reactions the bot attaches to the image as buttons
pub(crate) const REACTIONS: &str = "😡 / 😔 / 😐 / ☺️ / 😍";

impl<C: BotChat> ConversationGuard<'_, C> {
    /// Hands the image over to the bot along with the reactions for it.
    ///
    /// Each step waits for `settle_delay` before the next one so that the bot
    /// has the time to process the previous message. Nothing is returned, the
    /// result of the exchange has to be collected with [`Self::extract`].
    #[instrument(skip_all, fields(image = ?image, settle_delay = ?settle_delay))]
    pub(crate) async fn submit(&self, image: ImageBytes, settle_delay: Duration) -> Result {
        let timeout = self.call_timeout();
        let bot = self.resolve_bot().await?;

        self.chat()
            .send_text(&bot, RESET_COMMAND)
            .timeout("send_reset", timeout)
            .await?;

        tokio::time::sleep(settle_delay).await;

        self.chat()
            .send_image(&bot, &image)
            .timeout("send_image", timeout)
            .await?;

        tokio::time::sleep(settle_delay).await;

        self.chat()
            .send_text(&bot, REACTIONS)
            .timeout("send_reactions", timeout)
            .await?;

        debug!("Submitted the image to the bot");

        Ok(())
    }
}
