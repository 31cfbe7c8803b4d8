use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "commsage")]
#[command(author, version, about = "Communications-domain assistant chat client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a single question and print the answer
    Ask {
        prompt: String,

        /// Data source: remote, crawler, all or local
        #[arg(short = 's', long, default_value = "remote")]
        source: String,

        /// History file backing the conversation store
        #[arg(long)]
        history_file: Option<String>,
    },

    /// Start an interactive chat session
    Chat {
        /// History file backing the conversation store
        #[arg(long)]
        history_file: Option<String>,
    },

    /// List saved conversations
    History {
        /// History file backing the conversation store
        #[arg(long)]
        history_file: Option<String>,
    },

    /// Delete a saved conversation by id
    Delete {
        id: String,

        /// History file backing the conversation store
        #[arg(long)]
        history_file: Option<String>,
    },
}
