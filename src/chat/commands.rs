//! User command surface: parsing and the decision logic behind each
//! command. Dispatch-agnostic so any front end can drive it.
use crate::chat::models::ConversationState;
use crate::core::AppConfig;
use crate::persona;

const MIN_TOKEN_LEN: usize = 5;

const TOKEN_GUIDANCE: &str = "Please provide a valid token. You can easily get a token \
    for free at https://platform.openai.com/account/api-keys";

const START_FROM_SCRATCH_MESSAGES: [&str; 3] = [
    "Let's start from the scratch! How can I help?",
    "Let's start over! What might I assist you with?",
    "Let's start again! What's on your mind?",
];

#[derive(Debug, PartialEq)]
pub enum Command<'a> {
    Start,
    Clear,
    Token(Option<&'a str>),
    Mode(Option<&'a str>),
    Terse,
    Debug,
}

/// Parses a slash command from an inbound message. Returns `None` for
/// ordinary text so the caller can fall through to the exchange path.
pub fn parse(text: &str) -> Option<Command<'_>> {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let head = parts.next()?;
    let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match head {
        "/start" => Some(Command::Start),
        "/clear" => Some(Command::Clear),
        "/token" => Some(Command::Token(arg)),
        "/mode" => Some(Command::Mode(arg)),
        "/terse" => Some(Command::Terse),
        "/debug" => Some(Command::Debug),
        _ => None,
    }
}

/// Applies a command to the conversation and returns the reply text.
/// Invalid input re-prompts with guidance and leaves the state unchanged.
pub fn apply(command: Command<'_>, state: &mut ConversationState, config: &AppConfig) -> String {
    match command {
        Command::Start => format!(
            "Hey, I'm Ed GPT! I'm a bot that can create textual content based on your \
             input. To get started, send me a message with the text you want me to \
             generate content for. You can try it out for {} messages without an \
             OpenAI API token.\n\nAfter that, you'll need to provide a token to \
             continue using the bot.\n\nYou can easily get a token for free at \
             https://platform.openai.com/account/api-keys",
            config.free_message_limit
        ),
        Command::Clear => {
            state.transcript.reset();
            // Rotate through the canned messages instead of picking at random
            let idx = state.usage_count as usize % START_FROM_SCRATCH_MESSAGES.len();
            START_FROM_SCRATCH_MESSAGES[idx].to_string()
        }
        Command::Token(arg) => match arg {
            Some(token) if token.len() >= MIN_TOKEN_LEN => {
                state.api_key = Some(token.to_string());
                "Your token has been set. You can now use the bot without any \
                 limitations."
                    .to_string()
            }
            _ => TOKEN_GUIDANCE.to_string(),
        },
        Command::Mode(arg) => match arg.and_then(persona::find) {
            Some(selected) => {
                state.persona_code = Some(selected.code.to_string());
                format!("You are chatting with {}", selected.name)
            }
            None => format!("Available modes: {}", mode_list()),
        },
        Command::Terse => {
            state.terse_replies = !state.terse_replies;
            if state.terse_replies {
                "Short replies are now on.".to_string()
            } else {
                "Short replies are now off.".to_string()
            }
        }
        Command::Debug => serde_json::to_string_pretty(state)
            .unwrap_or_else(|err| format!("Failed to dump session: {}", err)),
    }
}

fn mode_list() -> String {
    persona::all()
        .iter()
        .map(|p| p.name)
        .collect::<Vec<_>>()
        .join(", ")
}
