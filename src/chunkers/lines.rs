//! Line classification for markdown-like documents.
//!
//! Every structural decision the engine makes (section boundaries, paragraph
//! boundaries, chunk flags) goes through the matchers in this module, so the
//! precedence between fences, headings and lists lives in one place.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Exactly three backticks, optional language tag, nothing else.
    static ref FENCE: Regex = Regex::new(r"^ {0,3}```[ \t]*([A-Za-z0-9_+#.\-]*)[ \t]*$").unwrap();
    /// 1-6 hashes, whitespace, non-empty title.
    static ref HEADING: Regex = Regex::new(r"^(#{1,6})[ \t]+(\S.*)$").unwrap();
    /// Bullet (`-`, `*`, `+`) or numbered (`1.`, `1)`) list marker.
    static ref LIST_ITEM: Regex = Regex::new(r"^[ \t]*(?:[-*+]|\d{1,9}[.)])[ \t]+\S").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`[^`\n]+`").unwrap();
}

/// Structural kind of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Fence delimiter, with its language tag when present
    Fence { language: Option<&'a str> },
    Heading { level: u8, title: &'a str },
    ListItem,
    Blank,
    Text,
}

/// Classify a line outside of any fenced block.
///
/// Precedence: fence, heading, list item, blank, text.
pub fn classify(line: &str) -> LineKind<'_> {
    if let Some(caps) = FENCE.captures(line) {
        let language = caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty());
        return LineKind::Fence { language };
    }
    if let Some((level, title)) = heading(line) {
        return LineKind::Heading { level, title };
    }
    if is_list_item(line) {
        return LineKind::ListItem;
    }
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    LineKind::Text
}

pub fn is_fence(line: &str) -> bool {
    FENCE.is_match(line)
}

/// Heading level and trimmed title of a heading line.
pub fn heading(line: &str) -> Option<(u8, &str)> {
    let caps = HEADING.captures(line)?;
    let level = caps.get(1)?.as_str().len() as u8;
    let title = caps.get(2)?.as_str().trim();
    if title.is_empty() {
        None
    } else {
        Some((level, title))
    }
}

pub fn is_list_item(line: &str) -> bool {
    LIST_ITEM.is_match(line)
}

pub fn has_inline_code(text: &str) -> bool {
    INLINE_CODE.is_match(text)
}

/// Transition observed by a [`FenceTracker`] on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenceEvent {
    /// Line opened a fenced block
    Open { language: Option<String> },
    /// Line closed the open fenced block
    Close,
    /// Line is inside a fenced block
    Inside,
    /// Line is outside any fenced block
    Outside,
}

/// Two-state machine tracking whether the scan is inside a fenced block.
///
/// Any fence delimiter line toggles the state, whether or not it carries a
/// language tag.
#[derive(Debug, Clone, Default)]
pub struct FenceTracker {
    inside: bool,
}

impl FenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    /// Feed the next line and report the transition it caused.
    pub fn observe(&mut self, line: &str) -> FenceEvent {
        match (self.inside, classify_fence(line)) {
            (false, Some(language)) => {
                self.inside = true;
                FenceEvent::Open {
                    language: language.map(String::from),
                }
            }
            (true, Some(_)) => {
                self.inside = false;
                FenceEvent::Close
            }
            (true, None) => FenceEvent::Inside,
            (false, None) => FenceEvent::Outside,
        }
    }
}

fn classify_fence(line: &str) -> Option<Option<&str>> {
    match classify(line) {
        LineKind::Fence { language } => Some(language),
        _ => None,
    }
}

/// URL-safe slug of a heading title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_headings() {
        assert_eq!(
            classify("## Setup"),
            LineKind::Heading {
                level: 2,
                title: "Setup"
            }
        );
        assert_eq!(
            classify("###### Deep  "),
            LineKind::Heading {
                level: 6,
                title: "Deep"
            }
        );
        assert_eq!(classify("####### Too deep"), LineKind::Text);
        assert_eq!(classify("#hashtag"), LineKind::Text);
        assert_eq!(classify("#   "), LineKind::Blank);
    }

    #[test]
    fn test_classify_fences() {
        assert_eq!(classify("```"), LineKind::Fence { language: None });
        assert_eq!(
            classify("```rust"),
            LineKind::Fence {
                language: Some("rust")
            }
        );
        assert_eq!(
            classify("```c++ "),
            LineKind::Fence {
                language: Some("c++")
            }
        );
        assert_eq!(classify("```rust fn main() {}"), LineKind::Text);
        assert_eq!(classify("    ```"), LineKind::Text);
        assert_eq!(classify("````"), LineKind::Text);
        assert_eq!(classify("````rust"), LineKind::Text);
    }

    #[test]
    fn test_classify_lists() {
        assert_eq!(classify("- item"), LineKind::ListItem);
        assert_eq!(classify("  * nested"), LineKind::ListItem);
        assert_eq!(classify("12. twelfth"), LineKind::ListItem);
        assert_eq!(classify("3) third"), LineKind::ListItem);
        assert_eq!(classify("-not a list"), LineKind::Text);
        assert_eq!(classify("2024 was a year"), LineKind::Text);
    }

    #[test]
    fn test_fence_precedence_over_text() {
        assert!(is_fence("```"));
        assert!(!is_fence("`` `"));
    }

    #[test]
    fn test_tracker_toggles() {
        let mut tracker = FenceTracker::new();
        assert_eq!(
            tracker.observe("```python"),
            FenceEvent::Open {
                language: Some("python".to_string())
            }
        );
        assert!(tracker.is_inside());
        assert_eq!(tracker.observe("# not a heading"), FenceEvent::Inside);
        assert_eq!(tracker.observe(""), FenceEvent::Inside);
        assert_eq!(tracker.observe("```"), FenceEvent::Close);
        assert!(!tracker.is_inside());
        assert_eq!(tracker.observe("text"), FenceEvent::Outside);
    }

    #[test]
    fn test_four_backticks_do_not_toggle() {
        let mut tracker = FenceTracker::new();
        assert_eq!(tracker.observe("````"), FenceEvent::Outside);
        tracker.observe("```");
        assert_eq!(tracker.observe("````"), FenceEvent::Inside);
        assert!(tracker.is_inside());
    }

    #[test]
    fn test_inline_code() {
        assert!(has_inline_code("call `run()` first"));
        assert!(!has_inline_code("no code here"));
        assert!(!has_inline_code("a lone ` tick"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("API: v2 / Overview!"), "api-v2-overview");
        assert_eq!(slugify("snake_case  and--dashes"), "snake-case-and-dashes");
        assert_eq!(slugify("Ünïcode Título"), "ünïcode-título");
        assert_eq!(slugify("???"), "section");
    }
}
