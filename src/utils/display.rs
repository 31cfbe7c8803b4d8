use crate::api::KnowledgeGraph;
use crate::conversation::{Role, Turn};
use crate::format::{format_blocks, Block, Span, StyledText};
use crate::store::ConversationSummary;
use colored::*;

/// History titles are shortened for the list only; storage keeps them whole.
pub const TITLE_PREVIEW_CHARS: usize = 50;

pub fn print_header(text: &str) {
    println!("\n{}", text.bright_cyan().bold());
    println!("{}", "=".repeat(text.len()).bright_cyan());
}

pub fn print_success(text: &str) {
    println!("{}", text.green());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red().bold());
}

pub fn print_info(text: &str) {
    println!("{}", text.blue());
}

pub fn print_prompt(text: &str) {
    print!("{}", text.yellow().bold());
}

pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() > max_chars {
        let short: String = title.chars().take(max_chars).collect();
        format!("{}...", short)
    } else {
        title.to_string()
    }
}

fn styled(text: &StyledText) -> String {
    text.spans()
        .iter()
        .map(|span| match span {
            Span::Plain(s) => s.clone(),
            Span::Emphasis(s) => s.bold().to_string(),
        })
        .collect()
}

/// Render an assistant reply as its classified blocks.
pub fn print_assistant_text(text: &str) {
    for block in format_blocks(text) {
        match block {
            Block::SectionTitle(title) => {
                println!("{}", title.plain().bright_cyan().bold());
            }
            Block::Subsection { label } => {
                println!("  {}", label.plain().bold());
            }
            Block::Labeled { label, value } => {
                println!("  {}: {}", label.plain().bold(), styled(&value));
            }
            Block::Paragraph(text) => {
                println!("  {}", styled(&text));
            }
        }
    }
}

pub fn print_transcript(turns: &[Turn]) {
    for turn in turns {
        match turn.role {
            Role::User => {
                println!("{} {}", "You:".yellow().bold(), turn.content);
            }
            Role::Assistant => {
                println!("{}", "Assistant:".blue());
                print_assistant_text(&turn.content);
            }
        }
        println!();
    }
}

pub fn print_history(summaries: &[ConversationSummary]) {
    if summaries.is_empty() {
        print_info("No saved conversations yet.");
        return;
    }

    for (index, summary) in summaries.iter().enumerate() {
        let detail = format!(
            "({} turns, {})",
            summary.turn_count,
            summary.updated_at.format("%Y-%m-%d %H:%M")
        );
        println!(
            "{:>3}. {} {}",
            index + 1,
            truncate_title(&summary.title, TITLE_PREVIEW_CHARS),
            detail.dimmed()
        );
    }
}

pub fn print_graph(graph: &KnowledgeGraph) {
    print_header("Knowledge graph");

    println!("{}", "Concepts:".bold());
    for node in &graph.nodes {
        if node.category.is_empty() {
            println!("  - {}", node.name);
        } else {
            println!("  - {} {}", node.name, format!("[{}]", node.category).dimmed());
        }
    }

    println!("{}", "Relations:".bold());
    for link in &graph.links {
        let source = node_name(graph, &link.source);
        let target = node_name(graph, &link.target);
        println!("  {} {} {}", source, link.relation.italic(), target);
    }
}

fn node_name<'a>(graph: &'a KnowledgeGraph, id: &'a str) -> &'a str {
    graph
        .nodes
        .iter()
        .find(|n| n.id == id)
        .map(|n| n.name.as_str())
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("short", 50), "short");

        let long = "x".repeat(60);
        let shown = truncate_title(&long, 50);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 53);
    }
}
