use std::process::exit;

use driftcord_client::{
    Attachment, Client, ClientConfig, ClientError, CreateMessage, Credential, Result, Snowflake,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Expect the bot token as the first argument and a channel id after
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <bot_token> <channel_id> [file]", args[0]);
        exit(1);
    }

    let channel_id = match args[2].parse::<u64>() {
        Ok(id) => Snowflake(id),
        Err(e) => {
            eprintln!("Invalid channel id: {}", e);
            exit(1);
        }
    };

    let client =
        Client::new(ClientConfig::default()).with_credential(Credential::bot(args[1].clone()));

    client.trigger_typing(channel_id).await?;

    let attachments = args
        .get(3)
        .map(|path| vec![Attachment::from_path(path).with_description("uploaded by basic_usage")])
        .unwrap_or_default();

    let message = client
        .create_message(channel_id, &CreateMessage::text("Hello from Rust"), attachments)
        .await?;
    println!("Sent message {} with {} attachment(s)", message.id, message.attachments.len());

    match client.delete_message(channel_id, message.id).await {
        Ok(()) => println!("Deleted message {}", message.id),
        Err(ClientError::UnexpectedStatus(403)) => println!("Not allowed to delete {}", message.id),
        Err(e) => return Err(e),
    }

    Ok(())
}
