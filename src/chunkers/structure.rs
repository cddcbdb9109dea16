//! Structure parser: splits a document into a preamble and flat sections.

use std::collections::HashSet;

use super::lines::{self, FenceEvent, FenceTracker};

/// A section of a document started by a heading line.
///
/// Sections are flat: a subsection's body is only the text between its own
/// heading and the next heading of any level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub level: u8,
    pub title: String,
    /// Slug of the title, unique within the document
    pub anchor: String,
    pub body: String,
    /// Line of the heading (1-based)
    pub start_line: usize,
    /// Last line before the next heading or end of input
    pub end_line: usize,
}

impl Section {
    /// First line of the body.
    pub fn body_start_line(&self) -> usize {
        self.start_line + 1
    }
}

/// A document split into its preamble and sections, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStructure {
    /// Content before the first heading; starts at line 1
    pub preamble: String,
    pub sections: Vec<Section>,
}

/// Parse a document into preamble and sections.
///
/// Heading lines inside fenced blocks are body text. With
/// `split_on_headings` off, the whole document is preamble.
pub fn parse(content: &str, split_on_headings: bool) -> DocumentStructure {
    if !split_on_headings {
        return DocumentStructure {
            preamble: content.lines().collect::<Vec<_>>().join("\n"),
            sections: Vec::new(),
        };
    }

    let mut preamble: Vec<&str> = Vec::new();
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<(Section, Vec<&str>)> = None;
    let mut anchors = AnchorSet::default();
    let mut fences = FenceTracker::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;

        if fences.observe(line) == FenceEvent::Outside {
            if let Some((level, title)) = lines::heading(line) {
                if let Some((section, body)) = current.take() {
                    sections.push(close_section(section, &body));
                }
                current = Some((
                    Section {
                        level,
                        title: title.to_string(),
                        anchor: anchors.claim(title),
                        body: String::new(),
                        start_line: line_no,
                        end_line: line_no,
                    },
                    Vec::new(),
                ));
                continue;
            }
        }

        match current.as_mut() {
            Some((_, body)) => body.push(line),
            None => preamble.push(line),
        }
    }

    if let Some((section, body)) = current.take() {
        sections.push(close_section(section, &body));
    }

    DocumentStructure {
        preamble: preamble.join("\n"),
        sections,
    }
}

fn close_section(mut section: Section, body: &[&str]) -> Section {
    section.end_line = section.start_line + body.len();
    section.body = body.join("\n");
    section
}

/// Hands out anchors, suffixing repeats with `-1`, `-2`, ...
#[derive(Debug, Default)]
struct AnchorSet {
    used: HashSet<String>,
}

impl AnchorSet {
    fn claim(&mut self, title: &str) -> String {
        let base = lines::slugify(title);
        if self.used.insert(base.clone()) {
            return base;
        }

        (1..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| self.used.insert(candidate.clone()))
            .unwrap_or(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preamble_and_sections() {
        let doc = "Intro line.\n\n# Guide\n\nGuide text.\n## Setup\nSetup text.\nMore.";
        let parsed = parse(doc, true);

        assert_eq!(parsed.preamble, "Intro line.\n");
        assert_eq!(parsed.sections.len(), 2);

        let guide = &parsed.sections[0];
        assert_eq!(guide.level, 1);
        assert_eq!(guide.title, "Guide");
        assert_eq!(guide.anchor, "guide");
        assert_eq!(guide.body, "\nGuide text.");
        assert_eq!((guide.start_line, guide.end_line), (3, 5));

        let setup = &parsed.sections[1];
        assert_eq!(setup.level, 2);
        assert_eq!(setup.body, "Setup text.\nMore.");
        assert_eq!((setup.start_line, setup.end_line), (6, 8));
        assert_eq!(setup.body_start_line(), 7);
    }

    #[test]
    fn test_no_headings_is_all_preamble() {
        let parsed = parse("just text\n\nmore text", true);
        assert!(parsed.sections.is_empty());
        assert_eq!(parsed.preamble, "just text\n\nmore text");
    }

    #[test]
    fn test_heading_inside_fence_is_body() {
        let doc = "# Script\n```bash\n# install deps\nmake\n```\n# Next";
        let parsed = parse(doc, true);

        assert_eq!(parsed.sections.len(), 2);
        assert_eq!(parsed.sections[0].body, "```bash\n# install deps\nmake\n```");
        assert_eq!(parsed.sections[1].title, "Next");
    }

    #[test]
    fn test_adjacent_headings_have_empty_bodies() {
        let parsed = parse("# A\n## B\ntext", true);
        assert_eq!(parsed.sections[0].body, "");
        assert_eq!(parsed.sections[0].end_line, 1);
        assert_eq!(parsed.sections[1].body, "text");
    }

    #[test]
    fn test_duplicate_anchors_are_suffixed() {
        let parsed = parse("## Example\na\n## Example\nb\n## Example\nc", true);
        let anchors: Vec<&str> = parsed.sections.iter().map(|s| s.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["example", "example-1", "example-2"]);
    }

    #[test]
    fn test_literal_suffix_does_not_collide() {
        let parsed = parse("## Intro 1\na\n## Intro\nb\n## Intro\nc", true);
        let anchors: Vec<&str> = parsed.sections.iter().map(|s| s.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["intro-1", "intro", "intro-2"]);
    }

    #[test]
    fn test_split_on_headings_disabled() {
        let parsed = parse("# A\ntext\n## B", false);
        assert!(parsed.sections.is_empty());
        assert_eq!(parsed.preamble, "# A\ntext\n## B");
    }
}
