use crate::console::is_stdin_terminal;
use crate::exceptions::ParleyError;
use std::io::Read;
use std::path::Path;

/// Piped stdin content, or None when stdin is a terminal or empty.
pub fn read_stdin() -> Option<String> {
    if is_stdin_terminal() {
        return None;
    }

    let mut buffer = String::new();
    if std::io::stdin().read_to_string(&mut buffer).is_err() {
        return None;
    }

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_file(path: &Path) -> Result<Option<String>, ParleyError> {
    let content = std::fs::read_to_string(path)?;
    let trimmed = content.trim();
    Ok(if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    })
}

/// Combines the positional question with piped/file content into the user
/// turn. With both present the content is attached below the question.
pub fn build_message(question: Option<String>, content: Option<String>) -> Option<String> {
    match (question, content) {
        (Some(question), Some(content)) => Some(format!("{}:\n\n{}", question, content)),
        (None, Some(content)) => Some(content),
        (Some(question), None) => Some(question),
        (None, None) => None,
    }
}
