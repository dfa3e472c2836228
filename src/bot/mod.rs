pub mod checks;
pub mod commands;
pub mod handlers;
pub mod interactions;
pub mod notify;
pub mod voice_task;

use crate::config::Config;
use crate::leveling::Ledger;
use anyhow::Result;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[derive(Clone)]
pub struct Data {
    pub ledger: Arc<Ledger>,
    pub config: Config,
}

pub async fn create_bot(config: Config, ledger: Arc<Ledger>) -> Result<serenity::Client> {
    let data = Data {
        ledger,
        config: config.clone(),
    };

    // Message XP needs GUILD_MESSAGES, the voice scan needs GUILD_VOICE_STATES.
    let intents = serenity::GatewayIntents::non_privileged();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::rank::rank(),
                commands::rank::top(),
                commands::moderation::addxp(),
                commands::moderation::removexp(),
                commands::moderation::setmultiplier(),
                commands::reset::resetlevels(),
            ],
            on_error: |error| Box::pin(handlers::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    Ok(client)
}
