use crate::{
    body::Attachment, request::RequestSpec, Client, CreateMessage, EditMessage, Message, Result,
    Snowflake, Sticker,
};

impl Client {
    // Stickers
    pub async fn get_sticker(&self, sticker_id: Snowflake) -> Result<Sticker> {
        self.get(&format!("stickers/{}", sticker_id), &[]).await
    }

    // Messages
    pub async fn get_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<Message> {
        self.send(RequestSpec::get(format!(
            "channels/{}/messages/{}",
            channel_id, message_id
        )))
        .await
    }

    /// Send a message, as multipart when `attachments` is non-empty.
    pub async fn create_message(
        &self,
        channel_id: Snowflake,
        message: &CreateMessage,
        attachments: Vec<Attachment>,
    ) -> Result<Message> {
        let path = format!("channels/{}/messages", channel_id);
        self.post(&path, message, attachments).await
    }

    pub async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        edit: &EditMessage,
    ) -> Result<Message> {
        let path = format!("channels/{}/messages/{}", channel_id, message_id);
        self.patch(&path, edit).await
    }

    pub async fn delete_message(&self, channel_id: Snowflake, message_id: Snowflake) -> Result<()> {
        let path = format!("channels/{}/messages/{}", channel_id, message_id);
        self.delete_empty(&path).await
    }

    pub async fn trigger_typing(&self, channel_id: Snowflake) -> Result<()> {
        self.execute(RequestSpec::post(format!("channels/{}/typing", channel_id)))
            .await
    }
}
