use crate::console::warn_provider_mismatch;
use crate::convstore::ConversationStore;
use crate::exceptions::ParleyError;
use crate::models::Conversation;
use crate::providers::ResolvedModel;
use std::path::PathBuf;

/// Continuation resolution shared by the single-shot and interactive modes:
/// new conversation, continue by recency index, or continue by id — the two
/// continuation flags are mutually exclusive. A provider mismatch against
/// the stored conversation warns and proceeds; the stored `provider` and
/// `model` fields are deliberately left untouched.
pub fn resolve_conversation(
    store: &ConversationStore,
    continue_n: Option<usize>,
    cid: Option<&str>,
    resolved: &ResolvedModel,
) -> Result<(Conversation, Option<PathBuf>), ParleyError> {
    if continue_n.is_some() && cid.is_some() {
        return Err(ParleyError::InvalidInput(
            "Cannot use both -c and --cid flags".to_string(),
        ));
    }

    let loaded = if let Some(n) = continue_n {
        Some(store.load_by_recency(n)?)
    } else if let Some(id) = cid {
        Some(store.load_by_id(id)?)
    } else {
        None
    };

    match loaded {
        Some((conversation, path)) => {
            if conversation.provider != resolved.provider.name() {
                warn_provider_mismatch(&conversation.provider, resolved.provider.name());
            }
            Ok((conversation, Some(path)))
        }
        None => Ok((
            store.create(resolved.provider.name(), &resolved.model_name),
            None,
        )),
    }
}
