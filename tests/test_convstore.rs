use parley::convstore::ConversationStore;
use parley::exceptions::ParleyError;
use parley::models::{ChatMessage, Conversation, Role};
use std::collections::HashSet;
use std::fs;
use tempfile::tempdir;
use time::macros::datetime;

fn conversation_at(id: &str, created: time::OffsetDateTime) -> Conversation {
    Conversation {
        id: id.to_string(),
        created_at: created,
        updated_at: created,
        provider: "perplexity".to_string(),
        model: "sonar".to_string(),
        messages: vec![
            ChatMessage {
                role: Role::User,
                content: format!("question for {}", id),
            },
            ChatMessage {
                role: Role::Assistant,
                content: format!("answer for {}", id),
            },
        ],
    }
}

#[test]
fn test_create_yields_fresh_empty_conversation() {
    let temp = tempdir().unwrap();
    let store = ConversationStore::new(temp.path().to_path_buf());

    let conversation = store.create("perplexity", "sonar");

    assert!(conversation.messages.is_empty());
    assert_eq!(conversation.created_at, conversation.updated_at);
    assert_eq!(conversation.id.len(), 8);
    assert_eq!(conversation.provider, "perplexity");
    assert_eq!(conversation.model, "sonar");

    // No I/O until the first save
    assert!(fs::read_dir(temp.path()).unwrap().next().is_none());
}

#[test]
fn test_create_allocates_distinct_ids() {
    let temp = tempdir().unwrap();
    let store = ConversationStore::new(temp.path().to_path_buf());

    let ids: HashSet<String> = (0..100)
        .map(|_| store.create("perplexity", "sonar").id)
        .collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn test_save_derives_canonical_file_name() {
    let temp = tempdir().unwrap();
    let store = ConversationStore::new(temp.path().to_path_buf());

    let mut conversation = conversation_at("abcd1234", datetime!(2024-03-05 08:30:15.250 UTC));
    let path = store.save(&mut conversation, None).unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert_eq!(name, "2024-03-05T08-30-15.250Z-abcd1234.json");
    assert!(!name.contains(':'));
}

#[test]
fn test_save_round_trips_through_locator() {
    let temp = tempdir().unwrap();
    let store = ConversationStore::new(temp.path().to_path_buf());

    let mut conversation = conversation_at("abcd1234", datetime!(2024-03-05 08:30:15.250 UTC));
    let before = conversation.clone();
    store.save(&mut conversation, None).unwrap();

    let (loaded, _) = store.load_by_recency(1).unwrap();
    assert_eq!(loaded.id, before.id);
    assert_eq!(loaded.provider, before.provider);
    assert_eq!(loaded.model, before.model);
    assert_eq!(loaded.messages, before.messages);
    // updated_at is refreshed on save
    assert!(loaded.updated_at >= before.updated_at);
}

#[test]
fn test_save_reuses_locator_without_duplicating() {
    let temp = tempdir().unwrap();
    let store = ConversationStore::new(temp.path().to_path_buf());

    let mut conversation = conversation_at("abcd1234", datetime!(2024-03-05 08:30:15.250 UTC));
    let first = store.save(&mut conversation, None).unwrap();

    conversation.push_user("another question");
    let second = store.save(&mut conversation, Some(&first)).unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn test_load_by_recency_returns_newest_first() {
    let temp = tempdir().unwrap();
    let store = ConversationStore::new(temp.path().to_path_buf());

    for (id, created) in [
        ("aaaa0001", datetime!(2024-01-01 10:00:00.000 UTC)),
        ("bbbb0002", datetime!(2024-02-01 10:00:00.000 UTC)),
        ("cccc0003", datetime!(2024-03-01 10:00:00.000 UTC)),
    ] {
        store
            .save(&mut conversation_at(id, created), None)
            .unwrap();
    }

    let (newest, _) = store.load_by_recency(1).unwrap();
    assert_eq!(newest.id, "cccc0003");

    let (oldest, _) = store.load_by_recency(3).unwrap();
    assert_eq!(oldest.id, "aaaa0001");
}

#[test]
fn test_load_by_recency_out_of_range() {
    let temp = tempdir().unwrap();
    let store = ConversationStore::new(temp.path().to_path_buf());

    store
        .save(
            &mut conversation_at("aaaa0001", datetime!(2024-01-01 10:00:00.000 UTC)),
            None,
        )
        .unwrap();

    let err = store.load_by_recency(2).unwrap_err();
    assert!(matches!(err, ParleyError::OutOfRange(_)));
    assert_eq!(err.to_string(), "Only 1 conversation(s) available");
}

#[test]
fn test_load_by_recency_rejects_index_zero() {
    let temp = tempdir().unwrap();
    let store = ConversationStore::new(temp.path().to_path_buf());

    assert!(matches!(
        store.load_by_recency(0),
        Err(ParleyError::InvalidInput(_))
    ));
}

#[test]
fn test_load_by_recency_without_directory_or_files() {
    let temp = tempdir().unwrap();

    let store = ConversationStore::new(temp.path().join("missing"));
    let err = store.load_by_recency(1).unwrap_err();
    assert!(matches!(err, ParleyError::NotFound(_)));
    assert_eq!(err.to_string(), "No conversations directory found");

    let store = ConversationStore::new(temp.path().to_path_buf());
    let err = store.load_by_recency(1).unwrap_err();
    assert!(matches!(err, ParleyError::NotFound(_)));
    assert_eq!(err.to_string(), "No previous conversations found");
}

#[test]
fn test_load_by_id_matches_trailing_component_only() {
    let temp = tempdir().unwrap();
    let store = ConversationStore::new(temp.path().to_path_buf());

    store
        .save(
            &mut conversation_at("abc12345", datetime!(2024-01-01 10:00:00.000 UTC)),
            None,
        )
        .unwrap();
    // Contains the id as a substring but not as the trailing -<id> component
    store
        .save(
            &mut conversation_at("abc12345x", datetime!(2024-02-01 10:00:00.000 UTC)),
            None,
        )
        .unwrap();
    store
        .save(
            &mut conversation_at("xabc12345", datetime!(2024-03-01 10:00:00.000 UTC)),
            None,
        )
        .unwrap();

    let (loaded, path) = store.load_by_id("abc12345").unwrap();
    assert_eq!(loaded.id, "abc12345");
    assert!(
        path.file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .ends_with("-abc12345.json")
    );
}

#[test]
fn test_load_by_id_not_found() {
    let temp = tempdir().unwrap();
    let store = ConversationStore::new(temp.path().to_path_buf());

    store
        .save(
            &mut conversation_at("aaaa0001", datetime!(2024-01-01 10:00:00.000 UTC)),
            None,
        )
        .unwrap();

    let err = store.load_by_id("zzzz9999").unwrap_err();
    assert!(matches!(err, ParleyError::NotFound(_)));
    assert_eq!(
        err.to_string(),
        "Conversation with ID \"zzzz9999\" not found"
    );
}

#[test]
fn test_list_all_newest_first_and_tolerates_missing_directory() {
    let temp = tempdir().unwrap();

    let store = ConversationStore::new(temp.path().join("missing"));
    assert!(store.list_all().unwrap().is_empty());

    let store = ConversationStore::new(temp.path().to_path_buf());
    for (id, created) in [
        ("aaaa0001", datetime!(2024-01-01 10:00:00.000 UTC)),
        ("bbbb0002", datetime!(2024-02-01 10:00:00.000 UTC)),
    ] {
        store
            .save(&mut conversation_at(id, created), None)
            .unwrap();
    }

    let all = store.list_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, "bbbb0002");
    assert_eq!(all[1].id, "aaaa0001");
}

#[test]
fn test_corrupt_file_is_fatal() {
    let temp = tempdir().unwrap();
    let store = ConversationStore::new(temp.path().to_path_buf());

    fs::write(
        temp.path().join("2024-01-01T10-00-00.000Z-aaaa0001.json"),
        "{ not valid json",
    )
    .unwrap();

    assert!(matches!(
        store.load_by_recency(1),
        Err(ParleyError::Serialization(_))
    ));
}

#[test]
fn test_stored_json_is_pretty_printed_camel_case() {
    let temp = tempdir().unwrap();
    let store = ConversationStore::new(temp.path().to_path_buf());

    let mut conversation = conversation_at("abcd1234", datetime!(2024-03-05 08:30:15.250 UTC));
    let path = store.save(&mut conversation, None).unwrap();

    let raw = fs::read_to_string(path).unwrap();
    assert!(raw.contains("\"createdAt\": \"2024-03-05T08:30:15.250Z\""));
    assert!(raw.contains("\"updatedAt\""));
    assert!(raw.contains("\"role\": \"user\""));
}
