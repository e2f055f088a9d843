//! Text sanitizing and URL detection for message bodies.
//!
//! Message text is shown verbatim in the terminal, so the only markup that
//! could "execute" is a control sequence. [`sanitize`] strips those before
//! anything is stored; [`linkify`] then splits bot text into plain and link
//! runs for styling.

use std::sync::LazyLock;

use regex::Regex;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("url pattern is valid"));

/// A run of message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRun<'a> {
    Plain(&'a str),
    Link(&'a str),
}

/// Removes control characters (ESC, BEL, CR, ...) except newline and tab.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Splits `text` into plain and link runs. Adjacent runs never share a kind.
pub fn linkify(text: &str) -> Vec<TextRun<'_>> {
    let mut runs = Vec::new();
    let mut last = 0;

    for m in URL.find_iter(text) {
        if m.start() > last {
            runs.push(TextRun::Plain(&text[last..m.start()]));
        }
        runs.push(TextRun::Link(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        runs.push(TextRun::Plain(&text[last..]));
    }

    runs
}
