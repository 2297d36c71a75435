use crate::commands::shared::resolve_conversation;
use crate::config;
use crate::convstore::ConversationStore;
use crate::exceptions::ParleyError;
use crate::input;
use crate::llm::driver;
use crate::models::build_ask_record;
use crate::providers::{self, ProviderFlags};
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
pub struct AskArgs {
    /// The question to ask (content can also be piped via stdin)
    pub question: Option<String>,

    #[command(flatten)]
    pub providers: ProviderFlags,

    /// Output as JSON instead of streaming
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Continue conversation N (1=last, 2=second-to-last)
    #[arg(short = 'c', long = "continue", value_name = "N")]
    pub continue_n: Option<usize>,

    /// Continue conversation by ID
    #[arg(long, value_name = "ID")]
    pub cid: Option<String>,

    /// Read content from file
    #[arg(short = 'f', long, value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}

pub async fn run(args: AskArgs) -> Result<(), ParleyError> {
    let stdin_content = input::read_stdin();
    let file_content = match &args.file {
        Some(path) => input::read_file(path)?,
        None => None,
    };

    if stdin_content.is_some() && args.file.is_some() {
        return Err(ParleyError::InvalidInput(
            "Cannot use both piped input and --file flag".to_string(),
        ));
    }

    let content = stdin_content.or(file_content);
    let Some(message) = input::build_message(args.question, content) else {
        return Err(ParleyError::InvalidInput(
            "No question provided. Use: parley \"question\" or pipe content".to_string(),
        ));
    };

    let config = config::load_config()?;
    config::ensure_directories()?;

    let provider = providers::determine_provider(&args.providers, &config);
    let resolved = providers::resolve_model(provider, &config)?;

    let store = ConversationStore::new(config::conversations_dir());
    let (mut conversation, existing_path) =
        resolve_conversation(&store, args.continue_n, args.cid.as_deref(), &resolved)?;

    conversation.push_user(message);

    if args.json {
        let reply = driver::generate_response(&resolved.handle, &conversation.messages).await?;
        // Built before the assistant turn lands: the count is prior
        // messages plus the response itself.
        let record = build_ask_record(
            &conversation,
            &reply.text,
            &reply.sources,
            reply.duration.as_millis() as u64,
        );

        conversation.push_assistant(reply.text);
        store.save(&mut conversation, existing_path.as_deref())?;

        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        let reply = driver::stream_response(&resolved.handle, &conversation.messages).await?;
        conversation.push_assistant(reply.text);
        store.save(&mut conversation, existing_path.as_deref())?;
    }

    Ok(())
}
