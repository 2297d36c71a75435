use crate::config;
use crate::console::truncate_chars;
use crate::convstore::ConversationStore;
use crate::exceptions::ParleyError;
use crate::models::{Role, format_timestamp};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

/// Terminal report of every stored conversation, newest first.
pub fn run() -> Result<(), ParleyError> {
    let store = ConversationStore::new(config::conversations_dir());
    let conversations = store.list_all()?;

    if conversations.is_empty() {
        println!("No conversations found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_style(comfy_table::TableComponent::HeaderLines, '─')
        .set_style(comfy_table::TableComponent::MiddleHeaderIntersections, ' ');

    table.set_header(vec![
        Cell::new("Id").add_attribute(Attribute::Bold),
        Cell::new("Created").add_attribute(Attribute::Bold),
        Cell::new("Provider").add_attribute(Attribute::Bold),
        Cell::new("Model").add_attribute(Attribute::Bold),
        Cell::new("Turns").add_attribute(Attribute::Bold),
        Cell::new("First question").add_attribute(Attribute::Bold),
    ]);

    for conversation in &conversations {
        let first_question = conversation
            .messages
            .iter()
            .find(|message| message.role == Role::User)
            .map(|message| message.content.replace('\n', " "))
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(&conversation.id),
            Cell::new(format_timestamp(conversation.created_at)),
            Cell::new(&conversation.provider),
            Cell::new(&conversation.model),
            Cell::new(conversation.messages.len()),
            Cell::new(truncate_chars(&first_question, 60)),
        ]);
    }

    println!("{}", table);
    Ok(())
}
