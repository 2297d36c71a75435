use crate::commands::shared::resolve_conversation;
use crate::config;
use crate::convstore::ConversationStore;
use crate::exceptions::ParleyError;
use crate::llm::driver;
use crate::providers::{self, ProviderFlags};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Debug, clap::Args)]
pub struct ChatArgs {
    #[command(flatten)]
    pub providers: ProviderFlags,

    /// Continue conversation N (1=last, 2=second-to-last)
    #[arg(short = 'c', long = "continue", value_name = "N")]
    pub continue_n: Option<usize>,

    /// Continue conversation by ID
    #[arg(long, value_name = "ID")]
    pub cid: Option<String>,
}

/// The loop only ever suspends while awaiting input; an interrupt there
/// transitions straight to Terminated with no side effects. Every completed
/// turn is saved before the next prompt, so an interrupt can only lose the
/// in-flight turn.
enum ChatState {
    AwaitingInput,
    Generating(String),
    Terminated,
}

pub async fn run(args: ChatArgs) -> Result<(), ParleyError> {
    let config = config::load_config()?;
    config::ensure_directories()?;

    let provider = providers::determine_provider(&args.providers, &config);
    let resolved = providers::resolve_model(provider, &config)?;

    let store = ConversationStore::new(config::conversations_dir());
    let (mut conversation, mut existing_path) =
        resolve_conversation(&store, args.continue_n, args.cid.as_deref(), &resolved)?;

    if existing_path.is_some() {
        println!(
            "Continuing conversation {} ({} messages)",
            conversation.id,
            conversation.messages.len()
        );
    } else {
        println!(
            "Starting new chat with {} ({})",
            resolved.provider, resolved.model_name
        );
    }
    println!("Type \"exit\" or press Ctrl+C to quit\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut state = ChatState::AwaitingInput;

    loop {
        state = match state {
            ChatState::AwaitingInput => match read_user_line(&mut lines).await? {
                Some(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        ChatState::AwaitingInput
                    } else if trimmed.eq_ignore_ascii_case("exit") {
                        ChatState::Terminated
                    } else {
                        ChatState::Generating(trimmed.to_string())
                    }
                }
                None => ChatState::Terminated,
            },
            ChatState::Generating(question) => {
                conversation.push_user(question);
                println!();

                let reply =
                    driver::stream_response(&resolved.handle, &conversation.messages).await?;
                conversation.push_assistant(reply.text);

                existing_path = Some(store.save(&mut conversation, existing_path.as_deref())?);
                ChatState::AwaitingInput
            }
            ChatState::Terminated => break,
        };
    }

    println!("\nChat ended. Conversation saved.");
    Ok(())
}

/// One line of input, or None on end-of-input or Ctrl+C.
async fn read_user_line(
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<Option<String>, ParleyError> {
    print!("You: ");
    std::io::stdout().flush()?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => Ok(None),
        line = lines.next_line() => Ok(line?),
    }
}
