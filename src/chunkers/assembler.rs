//! Chunk assembler: greedy packing of paragraphs under a token budget.

use std::ops::Range;

use super::base::TokenEstimator;
use super::lines::is_list_item;
use super::paragraph::{Paragraph, ParagraphKind, SYNTHETIC_FENCE_CLOSE};
use crate::types::ChunkingProfile;

/// Paragraphs packed into one chunk, with their summed token estimate.
#[derive(Debug, Clone, Default)]
pub struct ChunkBuffer {
    pub paragraphs: Vec<Paragraph>,
    pub tokens: usize,
}

impl ChunkBuffer {
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    fn push(&mut self, paragraph: Paragraph, tokens: usize) {
        self.paragraphs.push(paragraph);
        self.tokens = self.tokens.saturating_add(tokens);
    }
}

/// Packs a section's paragraphs into chunk buffers.
pub struct ChunkAssembler<'a, E: TokenEstimator> {
    profile: &'a ChunkingProfile,
    estimator: &'a E,
}

impl<'a, E: TokenEstimator> ChunkAssembler<'a, E> {
    pub fn new(profile: &'a ChunkingProfile, estimator: &'a E) -> Self {
        Self { profile, estimator }
    }

    /// Greedily pack paragraphs in order.
    ///
    /// A buffer is flushed before a paragraph that would push it over
    /// `max_tokens`, and after a paragraph that brings it to `target_tokens`
    /// unless that paragraph is an atomic code block. Paragraphs are never
    /// split here; an atomic paragraph above `max_tokens` becomes its own
    /// oversized chunk unless the profile asks for oversized blocks to be cut.
    pub fn assemble(&self, paragraphs: Vec<Paragraph>) -> Vec<ChunkBuffer> {
        let mut buffers = Vec::new();
        let mut buffer = ChunkBuffer::default();

        for paragraph in paragraphs.into_iter().flat_map(|p| self.cut_oversized(p)) {
            let tokens = self.estimator.estimate(&paragraph.content);

            let over_max = buffer.tokens.saturating_add(tokens) > self.profile.max_tokens;
            if !buffer.is_empty() && over_max {
                buffers.push(std::mem::take(&mut buffer));
            }

            let holds_flush = paragraph.is_code() && self.profile.preserve_code_blocks;
            buffer.push(paragraph, tokens);

            if buffer.tokens >= self.profile.target_tokens && !holds_flush {
                buffers.push(std::mem::take(&mut buffer));
            }
        }

        if !buffer.is_empty() {
            buffers.push(buffer);
        }

        buffers
    }

    fn should_cut(&self, paragraph: &Paragraph) -> bool {
        match paragraph.kind {
            ParagraphKind::Code => {
                self.profile.split_oversized || !self.profile.preserve_code_blocks
            }
            ParagraphKind::Text | ParagraphKind::List => self.profile.split_oversized,
        }
    }

    /// Cut an oversized paragraph at line boundaries, if the profile allows it.
    fn cut_oversized(&self, paragraph: Paragraph) -> Vec<Paragraph> {
        if self.estimator.estimate(&paragraph.content) <= self.profile.max_tokens
            || !self.should_cut(&paragraph)
        {
            return vec![paragraph];
        }

        match paragraph.kind {
            ParagraphKind::Code => self.cut_code(paragraph),
            ParagraphKind::Text | ParagraphKind::List => self.cut_text(paragraph),
        }
    }

    /// Cut a fenced block into pieces that each carry the opening fence and
    /// a closing fence.
    fn cut_code(&self, paragraph: Paragraph) -> Vec<Paragraph> {
        let lines: Vec<&str> = paragraph.content.lines().collect();
        if lines.len() < 3 {
            return vec![paragraph];
        }

        let opening = lines[0];
        let inner = &lines[1..lines.len() - 1];
        let fenced = |window: &[&str]| {
            format!("{}\n{}\n{}", opening, window.join("\n"), SYNTHETIC_FENCE_CLOSE)
        };

        let ranges = cut_lines(inner, |window| {
            self.estimator.estimate(&fenced(window)) <= self.profile.max_tokens
        });
        let last = ranges.len().saturating_sub(1);

        ranges
            .into_iter()
            .enumerate()
            .map(|(i, range)| Paragraph {
                content: fenced(&inner[range.clone()]),
                kind: ParagraphKind::Code,
                line_start: if i == 0 {
                    paragraph.line_start
                } else {
                    paragraph.line_start + 1 + range.start
                },
                line_end: if i == last {
                    paragraph.line_end
                } else {
                    paragraph.line_start + range.end
                },
            })
            .collect()
    }

    fn cut_text(&self, paragraph: Paragraph) -> Vec<Paragraph> {
        let lines: Vec<&str> = paragraph.content.lines().collect();
        let ranges = cut_lines(&lines, |window| {
            self.estimator.estimate(&window.join("\n")) <= self.profile.max_tokens
        });

        ranges
            .into_iter()
            .filter_map(|range| trim_blank_edges(&lines, range))
            .map(|range| {
                let window = &lines[range.clone()];
                Paragraph {
                    content: window.join("\n"),
                    kind: if is_list_item(window[0]) {
                        ParagraphKind::List
                    } else {
                        ParagraphKind::Text
                    },
                    line_start: paragraph.line_start + range.start,
                    line_end: paragraph.line_start + range.end - 1,
                }
            })
            .collect()
    }
}

/// Greedy line windows: each window grows while `fits` holds and always has
/// at least one line.
fn cut_lines(lines: &[&str], fits: impl Fn(&[&str]) -> bool) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;

    while start < lines.len() {
        let mut end = start + 1;
        while end < lines.len() && fits(&lines[start..end + 1]) {
            end += 1;
        }
        ranges.push(start..end);
        start = end;
    }

    ranges
}

fn trim_blank_edges(lines: &[&str], range: Range<usize>) -> Option<Range<usize>> {
    let is_blank = |i: &usize| lines[*i].trim().is_empty();
    let start = range.clone().find(|i| !is_blank(i))?;
    let end = range.rev().find(|i| !is_blank(i))? + 1;
    Some(start..end)
}
