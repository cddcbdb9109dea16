//! Paragraph splitter: blank-line paragraphs with atomic fenced blocks.

use super::lines::{self, FenceEvent, FenceTracker};

/// Closing delimiter appended to a fenced block left open at end of input.
pub const SYNTHETIC_FENCE_CLOSE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphKind {
    Text,
    /// A fenced code block, delimiters included
    Code,
    /// Text starting with a list item; with `preserve_lists`, a whole loose list
    List,
}

/// A unit of text the assembler packs into chunks without splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub content: String,
    pub kind: ParagraphKind,
    /// First source line (1-based, absolute in the document)
    pub line_start: usize,
    /// Last source line (1-based, absolute in the document)
    pub line_end: usize,
}

impl Paragraph {
    pub fn is_code(&self) -> bool {
        self.kind == ParagraphKind::Code
    }
}

/// Accumulates the lines of the paragraph being built.
struct OpenParagraph<'a> {
    lines: Vec<&'a str>,
    kind: ParagraphKind,
    line_start: usize,
    line_end: usize,
}

impl<'a> OpenParagraph<'a> {
    fn new(line: &'a str, kind: ParagraphKind, line_no: usize) -> Self {
        Self {
            lines: vec![line],
            kind,
            line_start: line_no,
            line_end: line_no,
        }
    }

    fn push(&mut self, line: &'a str, line_no: usize) {
        self.lines.push(line);
        self.line_end = line_no;
    }

    fn finish(self) -> Paragraph {
        Paragraph {
            content: self.lines.join("\n"),
            kind: self.kind,
            line_start: self.line_start,
            line_end: self.line_end,
        }
    }
}

/// Split a block of text into paragraphs.
///
/// `first_line` is the document line number of the block's first line. A
/// fenced block is always one paragraph, blank lines included; one left open
/// at end of input runs to the end and gets a synthetic closing fence.
pub fn split(text: &str, first_line: usize, preserve_lists: bool) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut current: Option<OpenParagraph<'_>> = None;
    let mut fences = FenceTracker::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = first_line + idx;

        match fences.observe(line) {
            FenceEvent::Open { .. } => {
                if let Some(open) = current.take() {
                    paragraphs.push(open.finish());
                }
                current = Some(OpenParagraph::new(line, ParagraphKind::Code, line_no));
            }
            FenceEvent::Inside => match current.as_mut() {
                Some(open) => open.push(line, line_no),
                None => current = Some(OpenParagraph::new(line, ParagraphKind::Code, line_no)),
            },
            FenceEvent::Close => {
                if let Some(mut open) = current.take() {
                    open.push(line, line_no);
                    paragraphs.push(open.finish());
                }
            }
            FenceEvent::Outside => {
                if line.trim().is_empty() {
                    if let Some(open) = current.take() {
                        paragraphs.push(open.finish());
                    }
                } else {
                    match current.as_mut() {
                        Some(open) => open.push(line, line_no),
                        None => {
                            let kind = if lines::is_list_item(line) {
                                ParagraphKind::List
                            } else {
                                ParagraphKind::Text
                            };
                            current = Some(OpenParagraph::new(line, kind, line_no));
                        }
                    }
                }
            }
        }
    }

    if let Some(open) = current.take() {
        let unterminated = fences.is_inside();
        let mut paragraph = open.finish();
        if unterminated {
            paragraph.content.push('\n');
            paragraph.content.push_str(SYNTHETIC_FENCE_CLOSE);
        }
        paragraphs.push(paragraph);
    }

    if preserve_lists {
        merge_lists(paragraphs)
    } else {
        paragraphs
    }
}

/// Merge loose lists into single atomic paragraphs.
///
/// A list paragraph absorbs following list paragraphs and indented
/// continuation paragraphs.
fn merge_lists(paragraphs: Vec<Paragraph>) -> Vec<Paragraph> {
    let mut merged: Vec<Paragraph> = Vec::with_capacity(paragraphs.len());

    for paragraph in paragraphs {
        if let Some(last) = merged.last_mut() {
            if last.kind == ParagraphKind::List && continues_list(&paragraph) {
                last.content.push_str("\n\n");
                last.content.push_str(&paragraph.content);
                last.line_end = paragraph.line_end;
                continue;
            }
        }
        merged.push(paragraph);
    }

    merged
}

fn continues_list(paragraph: &Paragraph) -> bool {
    match paragraph.kind {
        ParagraphKind::List => true,
        ParagraphKind::Text => paragraph.content.starts_with("  ") || paragraph.content.starts_with('\t'),
        ParagraphKind::Code => false,
    }
}
