use crate::exceptions::ParleyError;
use crate::fs::{atomic_write_json, read_json};
use crate::models::{Conversation, format_timestamp};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// Sole authority for conversation identity, lookup, and durability.
///
/// One file per conversation under `root`, named
/// `<createdAt with ':' replaced by '-'>-<id>.json`, so a lexical sort of
/// file names is creation-time order. The file name is derived once at
/// first save and reused via the locator returned by `save`.
#[derive(Debug)]
pub struct ConversationStore {
    root: PathBuf,
}

impl ConversationStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Pure in-memory construction; no I/O until the first `save`.
    pub fn create(&self, provider: &str, model: &str) -> Conversation {
        let now = OffsetDateTime::now_utc();
        Conversation {
            id: new_id(),
            created_at: now,
            updated_at: now,
            provider: provider.to_string(),
            model: model.to_string(),
            messages: Vec::new(),
        }
    }

    /// The n-th most recent conversation, 1-indexed (`n = 1` is the latest).
    pub fn load_by_recency(&self, n: usize) -> Result<(Conversation, PathBuf), ParleyError> {
        if n == 0 {
            return Err(ParleyError::InvalidInput(
                "Continuation index must be at least 1".to_string(),
            ));
        }

        let names = self.conversation_file_names()?;
        if names.is_empty() {
            return Err(ParleyError::NotFound(
                "No previous conversations found".to_string(),
            ));
        }
        if n > names.len() {
            return Err(ParleyError::OutOfRange(format!(
                "Only {} conversation(s) available",
                names.len()
            )));
        }

        let path = self.root.join(&names[n - 1]);
        let conversation = read_json(&path)?;
        Ok((conversation, path))
    }

    /// Exact match on the trailing `-<id>` component of the file stem; an id
    /// occurring elsewhere in the name never matches.
    pub fn load_by_id(&self, id: &str) -> Result<(Conversation, PathBuf), ParleyError> {
        let suffix = format!("-{}", id);
        let matching = self
            .conversation_file_names()?
            .into_iter()
            .find(|name| {
                name.strip_suffix(".json")
                    .is_some_and(|stem| stem.ends_with(&suffix))
            });

        let Some(name) = matching else {
            return Err(ParleyError::NotFound(format!(
                "Conversation with ID \"{}\" not found",
                id
            )));
        };

        let path = self.root.join(name);
        let conversation = read_json(&path)?;
        Ok((conversation, path))
    }

    /// Every stored conversation, newest first. An absent storage directory
    /// yields an empty list, never an error.
    pub fn list_all(&self) -> Result<Vec<Conversation>, ParleyError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        self.conversation_file_names()?
            .into_iter()
            .map(|name| read_json(&self.root.join(name)))
            .collect()
    }

    /// Refreshes `updated_at` and writes the full record. Without a locator
    /// (first save of a new conversation) the canonical path is derived from
    /// `created_at` and `id`; the returned locator must be reused for every
    /// later save so the file is never renamed or duplicated.
    pub fn save(
        &self,
        conversation: &mut Conversation,
        existing_path: Option<&Path>,
    ) -> Result<PathBuf, ParleyError> {
        conversation.updated_at = OffsetDateTime::now_utc();

        let path = match existing_path {
            Some(path) => path.to_path_buf(),
            None => self.canonical_path(conversation),
        };

        atomic_write_json(&path, conversation)?;
        Ok(path)
    }

    pub fn canonical_path(&self, conversation: &Conversation) -> PathBuf {
        let stamp = format_timestamp(conversation.created_at).replace(':', "-");
        self.root.join(format!("{}-{}.json", stamp, conversation.id))
    }

    /// File names sorted descending; the timestamp prefix makes that
    /// newest-first.
    fn conversation_file_names(&self) -> Result<Vec<String>, ParleyError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ParleyError::NotFound(
                    "No conversations directory found".to_string(),
                ));
            }
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(name) = name.to_str()
                && name.ends_with(".json")
            {
                names.push(name.to_string());
            }
        }

        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }
}

fn new_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
