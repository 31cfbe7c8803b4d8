use anyhow::Result;
use clap::Parser;
use commsage::api::{ChatClient, DataSource, GraphOutcome, SendOutcome};
use commsage::cli::{Cli, Commands};
use commsage::config::Settings;
use commsage::store::slot::FileSlot;
use commsage::store::ConversationStore;
use commsage::utils;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            prompt,
            source,
            history_file,
        } => handle_ask(prompt, source, history_file).await,
        Commands::Chat { history_file } => handle_chat(history_file).await,
        Commands::History { history_file } => handle_history(history_file).await,
        Commands::Delete { id, history_file } => handle_delete(id, history_file).await,
    }
}

async fn open_slot(settings: &Settings, history_file: Option<String>) -> Result<Arc<FileSlot>> {
    let path = PathBuf::from(history_file.unwrap_or_else(|| settings.history.path.clone()));
    Ok(Arc::new(FileSlot::new(path).await?))
}

async fn build_client(history_file: Option<String>) -> Result<ChatClient> {
    let settings = Settings::new()?;
    let api_key = Settings::api_key()?;
    let slot = open_slot(&settings, history_file).await?;
    Ok(ChatClient::new(settings, api_key, slot).await)
}

async fn handle_ask(prompt: String, source: String, history_file: Option<String>) -> Result<()> {
    let Some(source) = DataSource::parse(&source) else {
        utils::print_error(&format!("Unknown data source '{}'", source));
        return Ok(());
    };

    let mut client = build_client(history_file).await?;
    utils::print_info("Sending request...");

    render_outcome(client.send(&prompt, source).await);
    Ok(())
}

async fn handle_chat(history_file: Option<String>) -> Result<()> {
    let mut client = build_client(history_file).await?;
    let mut source = DataSource::default();

    utils::print_header("Interactive chat");
    utils::print_info("Type a question, or /help for commands (Ctrl+C to exit)\n");

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin);

    loop {
        utils::print_prompt("You: ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if reader.read_line(&mut input).await? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(rest) = input.strip_prefix('/') {
            if run_command(rest, &mut client, &mut source).await {
                break;
            }
            continue;
        }

        render_outcome(client.send(input, source).await);
    }

    Ok(())
}

fn render_outcome(outcome: SendOutcome) {
    match outcome {
        SendOutcome::Reply(reply) => {
            utils::print_info("Assistant:");
            utils::print_assistant_text(&reply);
            println!();
        }
        SendOutcome::Notice(notice) => {
            utils::print_info("Assistant:");
            utils::print_assistant_text(&notice);
            println!();
        }
        SendOutcome::Ignored => {}
    }
}

/// Run one slash command; returns true when the loop should exit.
async fn run_command(line: &str, client: &mut ChatClient, source: &mut DataSource) -> bool {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("");

    match command {
        "quit" | "exit" => return true,

        "help" => print_help(),

        "new" => {
            client.start_new_session();
            utils::print_success("Started a new conversation");
        }

        "history" => utils::print_history(&client.history()),

        "open" => match nth_id(client, parts.next()) {
            Some(id) => {
                if client.open_conversation(&id) {
                    utils::print_transcript(client.transcript());
                } else {
                    utils::print_error("That conversation is gone");
                }
            }
            None => utils::print_error("Usage: /open <number from /history>"),
        },

        "delete" => match nth_id(client, parts.next()) {
            Some(id) => {
                if client.delete_conversation(&id).await {
                    utils::print_success("Conversation deleted");
                } else {
                    utils::print_error("That conversation is gone");
                }
            }
            None => utils::print_error("Usage: /delete <number from /history>"),
        },

        "source" => match parts.next().and_then(DataSource::parse) {
            Some(parsed) => {
                *source = parsed;
                utils::print_success(&format!("Data source set to '{}'", parsed.label()));
            }
            None => utils::print_error("Usage: /source <remote|crawler|all|local>"),
        },

        "attach" => {
            let paths: Vec<PathBuf> = parts.map(PathBuf::from).collect();
            if paths.is_empty() {
                utils::print_error("Usage: /attach <path>...");
            } else {
                match client.uploads().attach_files(&paths).await {
                    Ok(added) => utils::print_success(&format!(
                        "Attached {} file(s): {}",
                        added.len(),
                        added
                            .iter()
                            .map(|f| f.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )),
                    Err(e) => utils::print_error(&e.to_string()),
                }
            }
        }

        "image" => {
            let paths: Vec<PathBuf> = parts.map(PathBuf::from).collect();
            if paths.is_empty() {
                utils::print_error("Usage: /image <path>...");
            } else {
                match client.uploads().attach_images(&paths).await {
                    Ok(added) => utils::print_success(&format!(
                        "Attached {} image(s): {}",
                        added.len(),
                        added
                            .iter()
                            .map(|f| f.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )),
                    Err(e) => utils::print_error(&e.to_string()),
                }
            }
        }

        "detach" => {
            let kind = parts.next().unwrap_or("");
            let index = parts.next().and_then(|n| n.parse::<usize>().ok());
            let removed = match (kind, index) {
                ("file", Some(n)) if n > 0 => client.uploads().remove_file(n - 1),
                ("image", Some(n)) if n > 0 => client.uploads().remove_image(n - 1),
                _ => {
                    utils::print_error("Usage: /detach <file|image> <number>");
                    return false;
                }
            };
            match removed {
                Some(meta) => utils::print_success(&format!("Removed {}", meta.name)),
                None => utils::print_error("No upload at that position"),
            }
        }

        "uploads" => {
            let tray = client.uploads();
            if tray.is_empty() {
                utils::print_info("Nothing attached.");
            } else {
                for (i, file) in tray.files().iter().enumerate() {
                    println!("  file  {}. {} ({} bytes)", i + 1, file.name, file.size);
                }
                for (i, image) in tray.images().iter().enumerate() {
                    println!(
                        "  image {}. {} ({} bytes)",
                        i + 1,
                        image.meta.name,
                        image.meta.size
                    );
                }
            }
        }

        "expand" => match client.expand_knowledge().await {
            SendOutcome::Ignored => utils::print_info("Nothing to expand yet."),
            outcome => render_outcome(outcome),
        },

        "graph" => match client.knowledge_graph().await {
            GraphOutcome::Graph(graph) => utils::print_graph(&graph),
            GraphOutcome::Notice(notice) => render_outcome(SendOutcome::Notice(notice)),
            GraphOutcome::Ignored => utils::print_info("Nothing to map yet."),
        },

        _ => utils::print_error(&format!("Unknown command '/{}', try /help", command)),
    }

    false
}

fn nth_id(client: &ChatClient, arg: Option<&str>) -> Option<String> {
    let index: usize = arg?.parse().ok()?;
    let summaries = client.history();
    summaries.get(index.checked_sub(1)?).map(|s| s.id.clone())
}

fn print_help() {
    println!("Commands:");
    println!("  /new                      start a new conversation");
    println!("  /history                  list saved conversations");
    println!("  /open <n>                 reopen a saved conversation");
    println!("  /delete <n>               delete a saved conversation");
    println!("  /source <name>            set the data source (remote, crawler, all, local)");
    println!("  /attach <path>...         attach files for the local-data source");
    println!("  /image <path>...          attach images for the local-data source");
    println!("  /detach <file|image> <n>  remove an attachment");
    println!("  /uploads                  list attachments");
    println!("  /expand                   expand on the latest answer");
    println!("  /graph                    extract a concept graph from the latest answer");
    println!("  /quit                     exit\n");
}

async fn handle_history(history_file: Option<String>) -> Result<()> {
    let settings = Settings::new()?;
    let slot = open_slot(&settings, history_file).await?;

    let mut store = ConversationStore::new(slot);
    store.load().await;

    utils::print_history(&store.summaries());
    Ok(())
}

async fn handle_delete(id: String, history_file: Option<String>) -> Result<()> {
    let settings = Settings::new()?;
    let slot = open_slot(&settings, history_file).await?;

    let mut store = ConversationStore::new(slot);
    store.load().await;

    if store.delete(&id) {
        store.persist().await;
        utils::print_success(&format!("Deleted conversation '{}'", id));
    } else {
        utils::print_error(&format!("No conversation with id '{}'", id));
    }
    Ok(())
}
