//! Small text helpers for table cells.

use std::fmt::Display;

/// Greedy word wrap at `width` columns. Words longer than the width get a
/// line of their own rather than being split.
#[must_use]
pub fn wrap(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// `[a,b,c]` summary of a sequence; empty input renders as `[]`.
#[must_use]
pub fn bracketed<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let parts: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
    format!("[{}]", parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_word_boundaries() {
        assert_eq!(wrap("a bcd ef", 5), "a bcd\nef");
        assert_eq!(wrap("short", 30), "short");
        assert_eq!(
            wrap("Runs batch processing jobs on large data sets", 30),
            "Runs batch processing jobs on\nlarge data sets"
        );
    }

    #[test]
    fn long_words_are_not_split() {
        assert_eq!(wrap("supercalifragilistic ok", 10), "supercalifragilistic\nok");
    }

    #[test]
    fn empty_text_wraps_to_empty() {
        assert_eq!(wrap("", 10), "");
        assert_eq!(wrap("   ", 10), "");
    }

    #[test]
    fn bracketed_joins_with_commas() {
        assert_eq!(bracketed(["a", "b"]), "[a,b]");
        assert_eq!(bracketed(Vec::<String>::new()), "[]");
        assert_eq!(bracketed([1, 2, 3]), "[1,2,3]");
    }
}
