use regex::{Captures, Regex};

use crate::persona::{Persona, RenderMode};

/// Renders the assistant's raw reply for the active persona.
pub fn render(raw: &str, persona: &Persona) -> String {
    match persona.render_mode {
        RenderMode::EscapedMarkup => escape_markup(raw),
        RenderMode::RichMarkup | RenderMode::PlainText => raw.to_string(),
    }
}

/// Backslash-escapes MarkdownV2 control characters in model output,
/// leaving well-formed `[text](url)` links untouched. The rendering
/// engine treats these characters as markup and raw model output
/// frequently contains them unescaped.
///
/// Not idempotent: escaping already-escaped text double-escapes it, so
/// callers must format each raw reply exactly once.
pub fn escape_markup(text: &str) -> String {
    let re = Regex::new(r"(\[[^\]\[]*\]\(http[^()]*\))|[_*\[\]()~>#+=|{}.!-]").unwrap();
    re.replace_all(text, |caps: &Captures| match caps.get(1) {
        Some(link) => link.as_str().to_string(),
        None => format!("\\{}", &caps[0]),
    })
    .into_owned()
}
