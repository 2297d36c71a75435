use clap::CommandFactory;
use clap::{Parser, Subcommand};
use parley::commands;
use parley::utils::setup_crypto_provider;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Route questions to hosted LLM providers from the terminal and keep the conversations",
    long_about = None,
    version = env!("CARGO_PKG_VERSION"),
    args_conflicts_with_subcommands = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    // `parley "question"` without a subcommand is an ask
    #[command(flatten)]
    ask: commands::ask::AskArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question (the default action)
    Ask(commands::ask::AskArgs),

    /// Start an interactive chat session
    Chat(commands::chat::ChatArgs),

    /// List available models for each provider
    Models {
        #[command(flatten)]
        providers: parley::providers::ProviderFlags,
    },

    /// Show all stored conversations
    Conversations,

    /// Show instructions for enabling shell completions.
    Completions,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    setup_crypto_provider();

    clap_complete::CompleteEnv::with_factory(Cli::command).complete();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Ask(cli.ask));

    let result = match command {
        Commands::Ask(args) => commands::ask::run(args).await,
        Commands::Chat(args) => commands::chat::run(args).await,
        Commands::Models { providers } => commands::models::run(providers).await,
        Commands::Conversations => commands::conversations::run(),
        Commands::Completions => {
            println!(
                "Bash:\n\
                echo \"source <(COMPLETE=bash parley)\" >> ~/.bashrc\n\
                \n\
                Elvish:\n\
                echo \"eval (E:COMPLETE=elvish parley | slurp)\" >> ~/.elvish/rc.elv\n\
                \n\
                Fish:\n\
                echo \"COMPLETE=fish parley | source\" >> ~/.config/fish/config.fish\n\
                \n\
                Zsh:\n\
                echo \"source <(COMPLETE=zsh parley)\" >> ~/.zshrc\n"
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
