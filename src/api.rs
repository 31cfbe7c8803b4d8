//! Chat Client Facade
//!
//! Wires the session controller, conversation store, upload tray and
//! completion client into the send, knowledge-expansion and
//! knowledge-graph flows. Every failure degrades to silence or to an
//! assistant-styled notice; nothing leaves this module as an error.

use crate::config::Settings;
use crate::conversation::{Role, Turn};
use crate::core::completion::{ChatMessage, CompletionClient};
use crate::session::{SessionController, TaskState};
use crate::store::slot::StorageSlot;
use crate::store::{ConversationStore, ConversationSummary};
use crate::uploads::UploadTray;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const LOCAL_NO_UPLOADS: &str = "You selected \"local uploads only\" but nothing has been \
                                uploaded yet. Attach a file and try again.";
const LOCAL_UNAVAILABLE: &str = "Answering from local data needs backend support that is \
                                 not available in this build.";
const SEND_FAILED: &str = "Something went wrong and no answer could be produced. Please \
                           try again later.";
const EXPAND_FAILED: &str = "Knowledge expansion failed. Please try again later.";
const GRAPH_FAILED: &str = "Knowledge graph extraction failed: the service did not return \
                            usable graph data.";

const GRAPH_SYSTEM_PROMPT: &str = "You are a knowledge-graph specialist. Extract structured \
                                   data exactly as requested.";

/// Where an answer should be sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    /// The remote completion service.
    #[default]
    Remote,
    /// The crawler corpus, blended in by the service.
    Crawler,
    /// Every available source fused.
    All,
    /// Locally uploaded data only (backend integration pending).
    Local,
}

impl DataSource {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" => Some(Self::Remote),
            "crawler" => Some(Self::Crawler),
            "all" => Some(Self::All),
            "local" => Some(Self::Local),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Crawler => "crawler",
            Self::All => "all",
            Self::Local => "local",
        }
    }

    fn prompt_prefix(self) -> Option<&'static str> {
        match self {
            Self::Remote => Some("[Answer from the remote service] "),
            Self::Crawler => Some("[Answer from the crawler corpus] "),
            Self::All => Some("[Answer by fusing all data sources] "),
            Self::Local => None,
        }
    }
}

/// What the UI should show after a send-like action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// An assistant reply, to be rendered as formatted blocks.
    Reply(String),
    /// An assistant-styled notice (guidance or a degraded failure). Notices
    /// are displayed but never enter the conversation history.
    Notice(String),
    /// Nothing to do: empty input or a rejected re-entrant action.
    Ignored,
}

/// Result of a knowledge-graph extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphOutcome {
    Graph(KnowledgeGraph),
    Notice(String),
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Local-data query assembled at send time. Deliberately never transmitted:
/// the backend for local-data answering does not exist yet, and uploads
/// must not leak into the completion call.
#[derive(Debug, Clone, Serialize)]
pub struct LocalQueryRequest {
    pub question: String,
    pub files: Vec<String>,
    pub images: Vec<String>,
}

pub struct ChatClient {
    settings: Settings,
    completion: CompletionClient,
    store: ConversationStore,
    controller: SessionController,
    uploads: UploadTray,
    expansion: TaskState,
}

impl ChatClient {
    /// Build a client over the given slot and load the persisted history.
    pub async fn new(settings: Settings, api_key: String, slot: Arc<dyn StorageSlot>) -> Self {
        let completion = CompletionClient::new(api_key, &settings);
        let mut store = ConversationStore::new(slot);
        store.load().await;
        let controller = SessionController::new(&store);
        let uploads = UploadTray::new(settings.uploads.max_per_kind);

        Self {
            settings,
            completion,
            store,
            controller,
            uploads,
            expansion: TaskState::default(),
        }
    }

    /// The primary send path. Deliberately unguarded against overlapping
    /// calls; turns land in the order their completions settle.
    pub async fn send(&mut self, input: &str, source: DataSource) -> SendOutcome {
        let message = input.trim();
        if message.is_empty() {
            return SendOutcome::Ignored;
        }

        if source == DataSource::Local {
            if self.uploads.is_empty() {
                return SendOutcome::Notice(LOCAL_NO_UPLOADS.to_string());
            }

            let request = LocalQueryRequest {
                question: message.to_string(),
                files: self.uploads.file_names(),
                images: self.uploads.image_names(),
            };
            tracing::debug!(?request, "local-data query assembled but not sent");
            return SendOutcome::Notice(LOCAL_UNAVAILABLE.to_string());
        }

        self.controller.append_turn(Role::User, message);

        let prompt = match source.prompt_prefix() {
            Some(prefix) => format!("{}{}", prefix, message),
            None => message.to_string(),
        };
        let messages = vec![
            ChatMessage::system(&self.settings.llm.system_prompt),
            ChatMessage::user(prompt),
        ];

        match self.completion.complete(messages).await {
            Ok(reply) => {
                self.controller.append_turn(Role::Assistant, &reply);
                self.controller.commit(&mut self.store);
                self.store.persist().await;
                SendOutcome::Reply(reply)
            }
            Err(e) => {
                tracing::warn!("completion call failed: {}", e);
                SendOutcome::Notice(SEND_FAILED.to_string())
            }
        }
    }

    /// Expand on the latest answer with related technologies, research and
    /// trends. Re-entrant calls while an expansion is outstanding are
    /// rejected. Expansion replies are shown but never committed.
    pub async fn expand_knowledge(&mut self) -> SendOutcome {
        let Some(answer) = self.controller.last_assistant_content().map(str::to_string) else {
            return SendOutcome::Ignored;
        };
        if !self.expansion.try_begin() {
            return SendOutcome::Ignored;
        }

        let messages = vec![
            ChatMessage::system(&self.settings.llm.system_prompt),
            ChatMessage::user(expansion_prompt(&answer)),
        ];

        match self.completion.complete(messages).await {
            Ok(reply) => {
                self.expansion.settle_ok();
                SendOutcome::Reply(reply)
            }
            Err(e) => {
                self.expansion.settle_err();
                tracing::warn!("knowledge expansion failed: {}", e);
                SendOutcome::Notice(EXPAND_FAILED.to_string())
            }
        }
    }

    /// Extract a concept graph from the latest answer.
    pub async fn knowledge_graph(&mut self) -> GraphOutcome {
        let Some(answer) = self.controller.last_assistant_content().map(str::to_string) else {
            return GraphOutcome::Ignored;
        };

        let messages = vec![
            ChatMessage::system(GRAPH_SYSTEM_PROMPT),
            ChatMessage::user(graph_prompt(&answer)),
        ];

        match self.completion.complete(messages).await {
            Ok(reply) => match parse_graph(&reply) {
                Some(graph) => GraphOutcome::Graph(graph),
                None => {
                    tracing::warn!("graph reply could not be parsed");
                    GraphOutcome::Notice(GRAPH_FAILED.to_string())
                }
            },
            Err(e) => {
                tracing::warn!("knowledge graph call failed: {}", e);
                GraphOutcome::Notice(GRAPH_FAILED.to_string())
            }
        }
    }

    /// Start a fresh session: new id, cleared turns, cleared uploads.
    pub fn start_new_session(&mut self) {
        self.controller.start_new(&self.store);
        self.uploads.clear();
    }

    /// Read-only history projections for the history list.
    pub fn history(&self) -> Vec<ConversationSummary> {
        self.store.summaries()
    }

    /// Load a stored conversation into the draft for continued editing.
    /// Uploads and the expansion guard are left untouched.
    pub fn open_conversation(&mut self, id: &str) -> bool {
        match self.store.find(id) {
            Some(conversation) => {
                let conversation = conversation.clone();
                self.controller.load_conversation(&conversation);
                true
            }
            None => false,
        }
    }

    /// Delete a stored conversation. Deleting the one being edited starts
    /// a fresh session.
    pub async fn delete_conversation(&mut self, id: &str) -> bool {
        if !self.store.delete(id) {
            return false;
        }
        self.store.persist().await;

        if self.controller.id() == id {
            self.start_new_session();
        }
        true
    }

    pub fn session_id(&self) -> &str {
        self.controller.id()
    }

    pub fn transcript(&self) -> &[Turn] {
        self.controller.turns()
    }

    pub fn uploads(&mut self) -> &mut UploadTray {
        &mut self.uploads
    }

    pub fn stored_count(&self) -> usize {
        self.store.len()
    }
}

fn expansion_prompt(answer: &str) -> String {
    format!(
        "Expand on the following communications-domain content with related \
         technologies, recent research and future trends:\n\n\
         Current content: {answer}\n\n\
         Required format:\n\
         ### Related technologies\n\
         - Technology 1: description\n\
         - Technology 2: description\n\n\
         ### Recent research\n\
         - Study 1: description\n\
         - Study 2: description\n\n\
         ### Future trends\n\
         - Trend 1: description\n\
         - Trend 2: description"
    )
}

fn graph_prompt(answer: &str) -> String {
    format!(
        "Extract the key concepts and relations from the following \
         communications-domain content and return JSON suitable for a \
         knowledge graph.\n\n\
         Required format:\n\
         {{\n\
           \"nodes\": [\n\
             {{\"id\": \"1\", \"name\": \"concept\", \"category\": \"kind\"}}\n\
           ],\n\
           \"links\": [\n\
             {{\"source\": \"1\", \"target\": \"2\", \"relation\": \"description\"}}\n\
           ]\n\
         }}\n\n\
         Content: {answer}"
    )
}

/// Parse the graph JSON, tolerating prose around the object.
fn parse_graph(reply: &str) -> Option<KnowledgeGraph> {
    if let Ok(graph) = serde_json::from_str(reply) {
        return Some(graph);
    }

    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if start >= end {
        return None;
    }
    serde_json::from_str(&reply[start..=end]).ok()
}
