/// Delimiter pair used in bank text and model replies to highlight a term: `*term*`.
pub const EMPHASIS_MARKER: char = '*';

pub fn strip_emphasis(text: &str) -> String {
    text.chars()
        .filter(|c| *c != EMPHASIS_MARKER)
        .collect::<String>()
        .trim()
        .to_string()
}
