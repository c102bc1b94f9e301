mod host;
mod quiz;
mod service;

use std::sync::Arc;

use dotenv::dotenv;
use host::mode_select::{ModalAction, ModalOutcome, ModeSelect};
use host::session::HostedSession;
use quiz::{library::QuizLibrary, preview};
use service::DataServiceConfig;
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
    types::{KeyboardRemove, ParseMode},
    utils::{command::BotCommands, html},
};

type HostDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type DialogueStorage = Arc<ErasedStorage<State>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ModeSelect {
        quiz_id: String,
        modal: ModeSelect,
        /// Session that was running when the dialog opened; restored on cancel.
        hosting: Option<HostedSession>,
    },
    Hosting {
        session: HostedSession,
    },
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "사용할 수 있는 명령어:")]
enum Command {
    #[command(description = "시작하기")]
    Start,
    #[command(description = "도움말 보기")]
    Help,
    #[command(description = "퀴즈 목록 보기")]
    Quizzes,
    #[command(description = "문제 미리보기 (정답 가림): /preview <퀴즈 ID>")]
    Preview(String),
    #[command(description = "문제 미리보기 (정답 공개): /answers <퀴즈 ID>")]
    Answers(String),
    #[command(description = "퀴즈 진행 설정 열기: /host <퀴즈 ID>")]
    Host(String),
    #[command(description = "진행 중인 세션 보기")]
    Session,
}

#[tokio::main]
async fn main() -> HandlerResult {
    let env_loaded = dotenv().is_ok();
    pretty_env_logger::init();
    if !env_loaded {
        log::debug!("No .env file found, using process environment");
    }
    log::info!("Starting quiz host bot...");

    let service = DataServiceConfig::from_env();
    log::info!(
        "Data service project: {} (analytics {})",
        service.project_id,
        if service.analytics_enabled() { "on" } else { "off" }
    );

    let library_path =
        std::env::var("QUIZ_LIBRARY").unwrap_or_else(|_| "quizzes.json".to_owned());
    log::info!("Loading quiz library from {}", library_path);
    let library = Arc::new(QuizLibrary::open(&library_path)?);
    log::info!("Loaded {} quizzes", library.len());

    let db_path = std::env::var("DIALOGUE_DB").unwrap_or_else(|_| "db.sqlite".to_owned());
    let storage: DialogueStorage = SqliteStorage::open(&db_path, Json).await?.erase();
    log::info!("Dialogue storage ready at {}", db_path);

    let bot = Bot::from_env();
    bot.set_my_commands(Command::bot_commands()).await?;

    let handler = Update::filter_message()
        .enter_dialogue::<Message, ErasedStorage<State>, State>()
        .branch(dptree::entry().filter_command::<Command>().endpoint(command))
        .branch(dptree::case![State::ModeSelect { quiz_id, modal, hosting }].endpoint(mode_select))
        .branch(dptree::endpoint(fallback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![storage, library])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

const GREETING_TEXT: &str = "안녕하세요! 퀴즈 진행을 도와드리는 호스트 봇입니다.";
const QUIZ_ID_REQUIRED: &str = "퀴즈 ID를 함께 입력해주세요. /quizzes 로 목록을 볼 수 있습니다.";

async fn command(
    bot: Bot,
    dialogue: HostDialogue,
    msg: Message,
    cmd: Command,
    library: Arc<QuizLibrary>,
) -> HandlerResult {
    match cmd {
        Command::Start | Command::Help => {
            bot.send_message(
                msg.chat.id,
                format!("{}\n\n{}", GREETING_TEXT, Command::descriptions()),
            )
            .await?;
        }
        Command::Quizzes => {
            let text = if library.is_empty() {
                "등록된 퀴즈가 없습니다".to_owned()
            } else {
                library
                    .list()
                    .map(|quiz| {
                        format!(
                            "• <code>{}</code> {} ({}문제)",
                            html::escape(&quiz.id),
                            html::escape(&quiz.title),
                            quiz.questions.len()
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Preview(id) => send_preview(&bot, msg.chat.id, &library, id.trim(), false).await?,
        Command::Answers(id) => send_preview(&bot, msg.chat.id, &library, id.trim(), true).await?,
        Command::Host(id) => open_mode_select(&bot, &dialogue, msg.chat.id, &library, id.trim()).await?,
        Command::Session => {
            let session = match dialogue.get().await? {
                Some(State::Hosting { session })
                | Some(State::ModeSelect {
                    hosting: Some(session),
                    ..
                }) => Some(session),
                _ => None,
            };
            match session {
                Some(session) => {
                    bot.send_message(msg.chat.id, session.summary_html())
                        .parse_mode(ParseMode::Html)
                        .await?;
                }
                None => {
                    bot.send_message(msg.chat.id, "진행 중인 세션이 없습니다")
                        .await?;
                }
            }
        }
    }
    Ok(())
}

async fn send_preview(
    bot: &Bot,
    chat_id: ChatId,
    library: &QuizLibrary,
    id: &str,
    reveal_answers: bool,
) -> HandlerResult {
    if id.is_empty() {
        bot.send_message(chat_id, QUIZ_ID_REQUIRED).await?;
        return Ok(());
    }

    let quiz = library.get(id);
    if let Some(quiz) = quiz {
        let heading = format!(
            "👁 <b>{}</b> 미리보기{}",
            html::escape(&quiz.title),
            if reveal_answers { " (정답 공개)" } else { "" }
        );
        bot.send_message(chat_id, heading)
            .parse_mode(ParseMode::Html)
            .await?;
    }

    for message in preview::render(quiz, reveal_answers).to_messages() {
        bot.send_message(chat_id, message)
            .parse_mode(ParseMode::Html)
            .await?;
    }
    Ok(())
}

async fn open_mode_select(
    bot: &Bot,
    dialogue: &HostDialogue,
    chat_id: ChatId,
    library: &QuizLibrary,
    id: &str,
) -> HandlerResult {
    if id.is_empty() {
        bot.send_message(chat_id, QUIZ_ID_REQUIRED).await?;
        return Ok(());
    }
    if library.get(id).is_none() {
        bot.send_message(chat_id, format!("퀴즈를 찾을 수 없습니다: {}", id))
            .await?;
        return Ok(());
    }

    let hosting = match dialogue.get().await? {
        Some(State::Hosting { session }) => Some(session),
        Some(State::ModeSelect { hosting, .. }) => hosting,
        _ => None,
    };
    let modal = ModeSelect::open();
    bot.send_message(chat_id, modal.to_html())
        .parse_mode(ParseMode::Html)
        .reply_markup(modal.keyboard())
        .await?;

    log::debug!("Opened mode dialog for quiz {} in chat {}", id, chat_id.0);
    dialogue
        .update(State::ModeSelect {
            quiz_id: id.to_owned(),
            modal,
            hosting,
        })
        .await?;
    Ok(())
}

async fn mode_select(
    bot: Bot,
    dialogue: HostDialogue,
    (quiz_id, modal, hosting): (String, ModeSelect, Option<HostedSession>),
    msg: Message,
    library: Arc<QuizLibrary>,
) -> HandlerResult {
    let Some(action) = msg.text().and_then(ModalAction::from_button) else {
        bot.send_message(msg.chat.id, "아래 버튼으로 선택해주세요")
            .reply_markup(modal.keyboard())
            .await?;
        return Ok(());
    };
    log::debug!("Mode dialog in chat {}: {:?}", msg.chat.id.0, action);

    match modal.handle(action) {
        ModalOutcome::Open(modal) => {
            bot.send_message(msg.chat.id, modal.to_html())
                .parse_mode(ParseMode::Html)
                .reply_markup(modal.keyboard())
                .await?;
            dialogue
                .update(State::ModeSelect {
                    quiz_id,
                    modal,
                    hosting,
                })
                .await?;
        }
        ModalOutcome::Closed => {
            bot.send_message(msg.chat.id, "설정을 취소했습니다")
                .reply_markup(KeyboardRemove::new())
                .await?;
            match hosting {
                Some(session) => dialogue.update(State::Hosting { session }).await?,
                None => dialogue.reset().await?,
            }
        }
        ModalOutcome::Confirmed(selection) => {
            let Some(quiz) = library.get(&quiz_id) else {
                bot.send_message(msg.chat.id, format!("퀴즈를 찾을 수 없습니다: {}", quiz_id))
                    .reply_markup(KeyboardRemove::new())
                    .await?;
                dialogue.reset().await?;
                return Ok(());
            };

            let session = HostedSession::start(quiz, selection);
            log::info!(
                "Chat {} is hosting quiz {} in {} mode ({} questions)",
                msg.chat.id.0,
                session.quiz_id,
                session.mode,
                session.question_order.len()
            );
            bot.send_message(msg.chat.id, session.summary_html())
                .parse_mode(ParseMode::Html)
                .reply_markup(KeyboardRemove::new())
                .await?;
            dialogue.update(State::Hosting { session }).await?;
        }
    }
    Ok(())
}

async fn fallback(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, "/help 로 사용할 수 있는 명령어를 확인해주세요")
        .await?;
    Ok(())
}
