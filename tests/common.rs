use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `~/.parley/config` inside the scratch home directory.
#[allow(dead_code)]
pub fn write_config(home: &Path, content: &str) {
    fs::create_dir_all(home).unwrap();
    fs::write(home.join("config"), content).unwrap();
}

/// Seeds a stored conversation file the way the store would have written
/// it. `stamp` must use the canonical millisecond form, e.g.
/// `2024-01-01T10:00:00.000Z`.
#[allow(dead_code)]
pub fn seed_conversation(
    home: &Path,
    stamp: &str,
    id: &str,
    provider: &str,
    model: &str,
    messages: &[(&str, &str)],
) -> PathBuf {
    let conversations_dir = home.join("conversations");
    fs::create_dir_all(&conversations_dir).unwrap();

    let body = json!({
        "id": id,
        "createdAt": stamp,
        "updatedAt": stamp,
        "provider": provider,
        "model": model,
        "messages": messages
            .iter()
            .map(|(role, content)| json!({"role": role, "content": content}))
            .collect::<Vec<_>>(),
    });

    let path = conversations_dir.join(format!("{}-{}.json", stamp.replace(':', "-"), id));
    fs::write(&path, serde_json::to_string_pretty(&body).unwrap()).unwrap();
    path
}

/// All conversation files in the scratch home, lexically sorted.
#[allow(dead_code)]
pub fn conversation_files(home: &Path) -> Vec<PathBuf> {
    let dir = home.join("conversations");
    if !dir.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

/// SSE body for a chat-completions stream producing "Hello world".
#[allow(dead_code)]
pub fn chat_completion_sse() -> String {
    let chunks = vec![
        r#"data: {"choices":[{"delta":{"role":"assistant","content":"Hel"}}]}"#,
        r#"data: {"choices":[{"delta":{"content":"lo "}}]}"#,
        r#"data: {"choices":[{"delta":{"content":"world"}}]}"#,
        "data: [DONE]",
    ];
    chunks.join("\n\n") + "\n\n"
}
