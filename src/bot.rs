use std::sync::Arc;

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ParseMode};
use teloxide::utils::command::BotCommands;

use crate::action::Action;
use crate::api::RecipeApi;
use crate::controller::PendingRequest;
use crate::db::SqliteStore;
use crate::flow::{self, Followup, Outcome};
use crate::render::{self, Detail, Screen};
use crate::session::Sessions;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
pub type SharedSessions = Arc<Sessions<SqliteStore>>;
pub type SharedApi = Arc<dyn RecipeApi>;

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "Display this text.")]
    Help,
    #[command(description = "Start using the bot.")]
    Start,
    #[command(description = "Search recipes by food name, e.g. /search pasta.")]
    Search(String),
    #[command(description = "Get a random recipe.")]
    Random,
    #[command(description = "Show your favorite recipes.")]
    Favorites,
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    let messages = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::endpoint(handle_text));

    dptree::entry()
        .branch(messages)
        .branch(Update::filter_callback_query().endpoint(handle_callback))
}

async fn send_screen(bot: &Bot, chat: ChatId, screen: Screen) -> Result<Message, teloxide::RequestError> {
    bot.send_message(chat, screen.text)
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(screen.keyboard)
        .await
}

async fn edit_screen(bot: &Bot, chat: ChatId, message: MessageId, screen: Screen) -> HandlerResult {
    bot.edit_message_text(chat, message, screen.text)
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(screen.keyboard)
        .await?;
    Ok(())
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    sessions: SharedSessions,
    api: SharedApi,
) -> HandlerResult {
    let chat = msg.chat.id;
    match cmd {
        Command::Help => {
            bot.send_message(chat, Command::descriptions().to_string())
                .await?;
        }
        Command::Start => {
            let screen = sessions.with(chat.0, |c| render::results(c));
            send_screen(&bot, chat, screen).await?;
        }
        Command::Search(query) => search(&bot, chat, &sessions, api.as_ref(), &query).await?,
        Command::Random => {
            let request = sessions.with(chat.0, |c| c.begin_random());
            run_request(&bot, chat, &sessions, api.as_ref(), request).await?;
        }
        Command::Favorites => {
            let screen = sessions.with(chat.0, |c| render::shelf(c));
            send_screen(&bot, chat, screen).await?;
        }
    }
    Ok(())
}

/// Plain text is a search, the way pressing Enter in a search box would be.
async fn handle_text(
    bot: Bot,
    msg: Message,
    sessions: SharedSessions,
    api: SharedApi,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if text.starts_with('/') {
        bot.send_message(msg.chat.id, Command::descriptions().to_string())
            .await?;
        return Ok(());
    }
    search(&bot, msg.chat.id, &sessions, api.as_ref(), text).await
}

async fn search(
    bot: &Bot,
    chat: ChatId,
    sessions: &Sessions<SqliteStore>,
    api: &dyn RecipeApi,
    query: &str,
) -> HandlerResult {
    match sessions.with(chat.0, |c| c.begin_search(query)) {
        Some(request) => run_request(bot, chat, sessions, api, request).await,
        None => {
            log::debug!("Ignoring blank search in chat {}", chat.0);
            Ok(())
        }
    }
}

/// Shows the loading screen, awaits the API, then replaces it with the
/// outcome. The session lock is released while the request is in flight.
async fn run_request(
    bot: &Bot,
    chat: ChatId,
    sessions: &Sessions<SqliteStore>,
    api: &dyn RecipeApi,
    request: PendingRequest,
) -> HandlerResult {
    let loading = send_screen(bot, chat, sessions.with(chat.0, |c| render::results(c))).await?;

    let outcome = request.run(api).await;

    match sessions.with(chat.0, |c| flow::settle(c, &request, outcome)) {
        Followup::Replace(screen) => edit_screen(bot, chat, loading.id, screen).await,
        Followup::Discard => {
            bot.delete_message(chat, loading.id).await?;
            Ok(())
        }
    }
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    sessions: SharedSessions,
) -> HandlerResult {
    let notice = match (q.data.as_deref(), q.regular_message()) {
        (Some(data), Some(message)) => match data.parse::<Action>() {
            Ok(action) => {
                let outcome = sessions.with(message.chat.id.0, |c| flow::plan(c, action));
                match carry_out(&bot, message, outcome).await {
                    Ok(notice) => notice,
                    Err(e) => {
                        log::error!("Failed to apply {:?} in chat {}: {}", data, message.chat.id.0, e);
                        None
                    }
                }
            }
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        },
        _ => None,
    };

    let mut answer = bot.answer_callback_query(q.id.clone());
    if let Some(text) = notice {
        answer = answer.text(text);
    }
    answer.await?;
    Ok(())
}

/// Sends the edits a button press asked for. Returns a short notice for the
/// user, if any.
async fn carry_out(
    bot: &Bot,
    message: &Message,
    outcome: Outcome,
) -> Result<Option<&'static str>, Box<dyn std::error::Error + Send + Sync>> {
    let chat = message.chat.id;
    match outcome {
        Outcome::Nothing => {}
        Outcome::Notice(text) => return Ok(Some(text)),
        Outcome::EditKeyboard(keyboard) => {
            bot.edit_message_reply_markup(chat, message.id)
                .reply_markup(keyboard)
                .await?;
        }
        Outcome::EditScreen(screen) => edit_screen(bot, chat, message.id, screen).await?,
        Outcome::SendScreen(screen) => {
            send_screen(bot, chat, screen).await?;
        }
        Outcome::ShowDetail(detail) => show_detail(bot, chat, detail).await?,
        Outcome::Delete { photo } => {
            bot.delete_message(chat, message.id).await?;
            if let Some(photo) = photo {
                if let Err(e) = bot.delete_message(chat, MessageId(photo)).await {
                    log::warn!("Could not delete picture {} in chat {}: {}", photo, chat.0, e);
                }
            }
        }
    }
    Ok(None)
}

/// Sends the recipe picture, if any, then the text whose buttons refer back to
/// it. A picture Telegram refuses is skipped; the text still goes out.
async fn show_detail(bot: &Bot, chat: ChatId, detail: Detail) -> HandlerResult {
    let mut photo = None;
    if let Some(raw) = detail.photo_url.as_deref() {
        match reqwest::Url::parse(raw) {
            Ok(url) => match bot.send_photo(chat, InputFile::url(url)).await {
                Ok(sent) => photo = Some(sent.id.0),
                Err(e) => log::warn!("Could not send picture {} in chat {}: {}", raw, chat.0, e),
            },
            Err(e) => log::warn!("Skipping malformed picture URL {:?}: {}", raw, e),
        }
    }

    let keyboard = detail.keyboard(photo);
    bot.send_message(chat, detail.text)
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}
