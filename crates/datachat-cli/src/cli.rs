//! CLI parser.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "datachat")]
#[command(about = "Chat with a language model about CSV datasets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Route one question over a CSV (file path or HTTP(S) URL) and print the result JSON.
    Analyze {
        #[arg(short, long)]
        csv: String,
        #[arg(short, long)]
        query: String,
        /// Allow the generative tier (needs OPENAI_API_KEY).
        #[arg(short, long)]
        generative: bool,
    },
    /// Interactive conversation on stdin; replies are streamed. `/quit` exits.
    Chat {
        /// Dataset attached to the first message.
        #[arg(short, long)]
        csv: Option<String>,
        /// Conversation title.
        #[arg(short, long, default_value = conversation::DEFAULT_TITLE)]
        title: String,
    },
    /// Apply the context window to a JSON array of messages and print a report.
    Window {
        #[arg(short, long)]
        file: String,
        #[arg(long)]
        max_messages: Option<usize>,
        #[arg(long)]
        preserve_first: Option<usize>,
        #[arg(long)]
        token_limit: Option<usize>,
    },
}
