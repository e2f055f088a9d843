//! # Reply Formatter
//!
//! The server answers with plain text whose paragraph formatting is
//! inconsistent. This module decides how many chat bubbles a reply becomes,
//! when each one appears, and whether the restart control follows them.
//!
//! ```text
//! reply ──► isolate email prompts ──► split on blank lines
//!                                         │
//!                 ≥ 2 paragraphs ◄────────┴────────► 0/1 paragraph
//!                 one bubble each                    split_into_two()
//!                 0, step, 2·step, ...               0, step
//! ```
//!
//! All positions are char indexes, so a split never lands inside a
//! multi-byte character.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("paragraph pattern is valid"));

/// Upper bound on how far from the midpoint sentence punctuation is searched.
const MAX_SEARCH_RADIUS: usize = 60;

pub const DEFAULT_BUBBLE_INTERVAL: Duration = Duration::from_millis(400);
pub const DEFAULT_RESTART_GRACE: Duration = Duration::from_millis(200);

pub const DEFAULT_EMAIL_PROMPTS: &[&str] = &[
    "May I have your email address to send you more details?",
    "Please type your email address, we will send you an email summary of our conversation for your reference",
    "Please type your email address",
];

pub const DEFAULT_FINAL_MARKERS: &[&str] = &[
    "Great! Thank you for signing up.",
    "If you want to calculate again",
    "Thank you for contacting us.",
];

/// One bubble and how long after the reply arrived it should appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledBubble {
    pub text: String,
    pub delay: Duration,
}

/// Everything needed to present one reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplyPlan {
    /// Bubbles in display order; delays are strictly increasing.
    pub bubbles: Vec<ScheduledBubble>,
    /// When set, the restart control is revealed after this delay.
    pub restart_at: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct ReplyFormatter {
    pub email_prompts: Vec<String>,
    pub final_markers: Vec<String>,
    /// Replies containing any of these are never split by the fallback.
    pub keep_single: Vec<String>,
    pub step: Duration,
    pub restart_grace: Duration,
}

impl Default for ReplyFormatter {
    fn default() -> Self {
        Self {
            email_prompts: DEFAULT_EMAIL_PROMPTS.iter().map(|s| s.to_string()).collect(),
            final_markers: DEFAULT_FINAL_MARKERS.iter().map(|s| s.to_string()).collect(),
            keep_single: Vec::new(),
            step: DEFAULT_BUBBLE_INTERVAL,
            restart_grace: DEFAULT_RESTART_GRACE,
        }
    }
}

impl ReplyFormatter {
    pub fn plan(&self, reply: &str) -> ReplyPlan {
        let reply = self.isolate_email_prompts(reply);
        let parts = paragraphs(&reply);

        let paragraphed = parts.len() >= 2;
        let texts: Vec<String> = if paragraphed {
            parts.into_iter().map(str::to_string).collect()
        } else if self.keeps_single(&reply) {
            let whole = reply.trim();
            if whole.is_empty() {
                Vec::new()
            } else {
                vec![whole.to_string()]
            }
        } else {
            let (first, second) = split_into_two(&reply);
            [first, second].into_iter().filter(|s| !s.is_empty()).collect()
        };

        let bubbles: Vec<ScheduledBubble> = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| ScheduledBubble {
                text,
                delay: self.step * i as u32,
            })
            .collect();

        let restart_at = self.is_final(&reply).then(|| {
            if paragraphed {
                let last = bubbles.last().map_or(Duration::ZERO, |b| b.delay);
                last + self.step + self.restart_grace
            } else if bubbles.len() >= 2 {
                // 900 ms at the default step
                self.step * 2 + self.step / 4
            } else {
                self.step
            }
        });

        ReplyPlan {
            bubbles,
            restart_at,
        }
    }

    /// Puts a paragraph break in front of every email prompt that isn't
    /// already at the start or behind one.
    pub fn isolate_email_prompts(&self, reply: &str) -> String {
        self.email_prompts
            .iter()
            .filter(|p| !p.is_empty())
            .fold(reply.to_string(), |text, prompt| isolate(&text, prompt))
    }

    pub fn is_final(&self, reply: &str) -> bool {
        self.final_markers
            .iter()
            .any(|m| !m.is_empty() && reply.contains(m.as_str()))
    }

    fn keeps_single(&self, reply: &str) -> bool {
        self.keep_single
            .iter()
            .any(|p| !p.is_empty() && reply.contains(p.as_str()))
    }
}

fn isolate(text: &str, prompt: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut rest = text;

    while let Some(idx) = rest.find(prompt) {
        out.push_str(&rest[..idx]);
        if !out.is_empty() && !out.ends_with("\n\n") {
            out.truncate(out.trim_end().len());
            out.push_str("\n\n");
        }
        out.push_str(prompt);
        rest = &rest[idx + prompt.len()..];
    }
    out.push_str(rest);

    out
}

/// Splits on runs of two or more newlines, dropping blank paragraphs.
pub fn paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Splits a reply without clear paragraphs into two natural halves.
/// Either half may be empty.
pub fn split_into_two(text: &str) -> (String, String) {
    let text = text.trim();
    if text.is_empty() {
        return (String::new(), String::new());
    }

    let blocks: Vec<&str> = PARAGRAPH_BREAK.split(text).collect();
    if blocks.len() >= 2 {
        return (
            blocks[0].trim().to_string(),
            blocks[1..].join("\n\n").trim().to_string(),
        );
    }

    if let Some(nl) = text.find('\n') {
        return (
            text[..nl].trim().to_string(),
            text[nl + 1..].trim().to_string(),
        );
    }

    let chars: Vec<char> = text.chars().collect();
    let idx = split_point(&chars);
    (
        chars[..idx].iter().collect::<String>().trim().to_string(),
        chars[idx..].iter().collect::<String>().trim().to_string(),
    )
}

/// Char index at which single-line text is cut in two.
///
/// Tries, in order: just after the first `.`, `!` or `?` within the search
/// radius of the midpoint; the space nearest the midpoint (left wins a tie),
/// where a space only on the left counts as none; the midpoint itself. Only
/// `' '` counts as a space.
pub fn split_point(chars: &[char]) -> usize {
    let len = chars.len();
    if len == 0 {
        return 0;
    }

    let mid = len / 2;
    let radius = MAX_SEARCH_RADIUS.min(len / 6);
    let lo = mid.saturating_sub(radius);
    let hi = len.min(mid + radius);

    if let Some(i) = (lo..hi).find(|&i| matches!(chars[i], '.' | '!' | '?')) {
        return i + 1;
    }

    let left = (0..=mid).rev().find(|&i| chars[i] == ' ');
    let right = (mid + 1..len).find(|&i| chars[i] == ' ');

    match (left, right) {
        (Some(l), Some(r)) if mid - l <= r - mid => l,
        (_, Some(r)) => r,
        (_, None) => mid,
    }
}
