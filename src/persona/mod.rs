//! Static registry of chat personas. Each persona pairs a system prompt
//! with the rendering rules for its replies. The set is fixed at compile
//! time and exactly one persona is the default.

/// How the front end should render a persona's replies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    PlainText,
    RichMarkup,
    EscapedMarkup,
}

#[derive(Debug)]
pub struct Persona {
    pub code: &'static str,
    pub name: &'static str,
    pub welcome_message: &'static str,
    pub system_prompt: &'static str,
    pub render_mode: RenderMode,
}

pub const DEFAULT_PERSONA_CODE: &str = "ASSISTANT";

static PERSONAS: &[Persona] = &[
    Persona {
        code: "ASSISTANT",
        name: "Assistant 🧑🏼‍💻",
        welcome_message: "Hey, I am Ed, your personal assistant. How can I help you?",
        system_prompt: "You are an high-tech Ed GPT, a bot that can create textual content \
            based on user input. Your goal is to help the user to get the best out of the \
            Ed GPT. This may involve answering questions, completing tasks for the user and \
            help your based on their input. Be thoughtful in your answers and try to be as \
            helpful as possible.",
        render_mode: RenderMode::RichMarkup,
    },
    Persona {
        code: "TECHNICAL_WRITER",
        name: "Technical writer ✍🏼",
        welcome_message: "You are an high-tech Ed GPT, a bot that can create textual content \
            based on user input. You are an expert in technical writing. Your goal is to help \
            user make their content mistake free, easy to understand and engaging.",
        system_prompt: "This is a conversation with an AI technical writer. The technical \
            writer is helpful, creative, clever, and very friendly.",
        render_mode: RenderMode::EscapedMarkup,
    },
];

pub fn all() -> &'static [Persona] {
    PERSONAS
}

/// Looks up a persona by its stable code or display name. Selection menus
/// submit the display name while persisted sessions store the code, so
/// both are accepted. Returns `None` rather than failing because callers
/// treat an unknown selection as "use the default".
pub fn find(selector: &str) -> Option<&'static Persona> {
    PERSONAS
        .iter()
        .find(|p| p.code == selector || p.name == selector)
}

pub fn default_persona() -> &'static Persona {
    find(DEFAULT_PERSONA_CODE).expect("default persona must exist in the registry")
}

/// Resolves an optional persona selection, falling back to the default
/// when absent or unknown.
pub fn resolve(selector: Option<&str>) -> &'static Persona {
    selector.and_then(find).unwrap_or_else(default_persona)
}
