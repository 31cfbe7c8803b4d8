//! Marker-Text Formatter
//!
//! Stateless classifier turning loosely structured assistant output into
//! renderable blocks. Same input, same output; every line is classified
//! on its own with no cross-line state.

use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").unwrap());

/// Inline fragment of block text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Plain(String),
    Emphasis(String),
}

/// Line text with paired `**` markers resolved into emphasis spans.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledText(Vec<Span>);

impl StyledText {
    pub fn spans(&self) -> &[Span] {
        &self.0
    }

    /// The text with markers resolved and styling dropped.
    pub fn plain(&self) -> String {
        self.0
            .iter()
            .map(|span| match span {
                Span::Plain(s) | Span::Emphasis(s) => s.as_str(),
            })
            .collect()
    }
}

impl From<&str> for StyledText {
    fn from(text: &str) -> Self {
        StyledText(parse_spans(text))
    }
}

/// One typed display block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Numbered heading line, kept whole.
    SectionTitle(StyledText),
    /// Dashed sub-heading, dash stripped.
    Subsection { label: StyledText },
    /// `label: value` line, split on the first colon only.
    Labeled { label: StyledText, value: StyledText },
    Paragraph(StyledText),
}

/// Classify raw assistant text into an ordered block sequence.
///
/// Sections are delimited by the literal `###`; empty sections (including a
/// whitespace-only preamble) are dropped, and blank lines contribute
/// nothing.
pub fn format_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();

    for section in text.split("###") {
        let section = section.trim();
        if section.is_empty() {
            continue;
        }

        for line in section.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            blocks.push(classify(line));
        }
    }

    blocks
}

/// Per-line classification, first match wins.
fn classify(line: &str) -> Block {
    if SECTION_TITLE.is_match(line) {
        return Block::SectionTitle(line.into());
    }

    if let Some(rest) = line.strip_prefix('-') {
        return Block::Subsection {
            label: rest.trim().into(),
        };
    }

    if let Some(colon) = line.find(':') {
        let (label, value) = line.split_at(colon);
        return Block::Labeled {
            label: label.trim().into(),
            value: value[1..].trim().into(),
        };
    }

    Block::Paragraph(line.into())
}

/// Pair `**` runs left-to-right, non-overlapping, non-nested. An unpaired
/// trailing run stays literal.
fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        match rest[open + 2..].find("**") {
            Some(close) => {
                if open > 0 {
                    spans.push(Span::Plain(rest[..open].to_string()));
                }
                spans.push(Span::Emphasis(rest[open + 2..open + 2 + close].to_string()));
                rest = &rest[open + 2 + close + 2..];
            }
            None => break,
        }
    }

    if !rest.is_empty() {
        spans.push(Span::Plain(rest.to_string()));
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_input_is_one_paragraph() {
        let blocks = format_blocks("  just a plain sentence  ");
        assert_eq!(
            blocks,
            vec![Block::Paragraph("just a plain sentence".into())]
        );
    }

    #[test]
    fn test_section_scenario() {
        let blocks = format_blocks("###\n1. first\n- second\nlabel: value\nplain");
        assert_eq!(
            blocks,
            vec![
                Block::SectionTitle("1. first".into()),
                Block::Subsection {
                    label: "second".into()
                },
                Block::Labeled {
                    label: "label".into(),
                    value: "value".into()
                },
                Block::Paragraph("plain".into()),
            ]
        );
    }

    #[test]
    fn test_heading_line_classifies_as_paragraph() {
        let blocks = format_blocks("### Related technologies\n- NFV: network function virtualization");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("Related technologies".into()),
                // The dash rule outranks the colon rule.
                Block::Subsection {
                    label: "NFV: network function virtualization".into()
                },
            ]
        );
    }

    #[test]
    fn test_labeled_splits_on_first_colon_only() {
        let blocks = format_blocks("standard: TS 38.331: RRC");
        assert_eq!(
            blocks,
            vec![Block::Labeled {
                label: "standard".into(),
                value: "TS 38.331: RRC".into()
            }]
        );
    }

    #[test]
    fn test_whitespace_preamble_dropped_nonempty_kept() {
        assert_eq!(format_blocks("   \n### first\nbody"), vec![
            Block::Paragraph("first".into()),
            Block::Paragraph("body".into()),
        ]);

        let with_preamble = format_blocks("intro line\n### first\nbody");
        assert_eq!(with_preamble[0], Block::Paragraph("intro line".into()));
        assert_eq!(with_preamble.len(), 3);
    }

    #[test]
    fn test_emphasis_pairs() {
        let styled: StyledText = "a **b** and **c**".into();
        assert_eq!(
            styled.spans(),
            &[
                Span::Plain("a ".to_string()),
                Span::Emphasis("b".to_string()),
                Span::Plain(" and ".to_string()),
                Span::Emphasis("c".to_string()),
            ]
        );
        assert_eq!(styled.plain(), "a b and c");
    }

    #[test]
    fn test_unpaired_marker_stays_literal() {
        let styled: StyledText = "odd ** marker".into();
        assert_eq!(styled.spans(), &[Span::Plain("odd ** marker".to_string())]);

        let trailing: StyledText = "**done** but **open".into();
        assert_eq!(
            trailing.spans(),
            &[
                Span::Emphasis("done".to_string()),
                Span::Plain(" but **open".to_string()),
            ]
        );
    }

    #[test]
    fn test_numbered_line_beats_colon_rule() {
        let blocks = format_blocks("1. intro: scope");
        assert_eq!(blocks, vec![Block::SectionTitle("1. intro: scope".into())]);
    }

    #[test]
    fn test_deterministic() {
        let input = "### A\n1. first\n**bold**: rest\n- sub";
        assert_eq!(format_blocks(input), format_blocks(input));
    }

    #[test]
    fn test_empty_input_yields_no_blocks() {
        assert!(format_blocks("").is_empty());
        assert!(format_blocks("### \n\n###").is_empty());
    }
}
