//! Inline tokenizer: one left-to-right scan with explicit delimiter matching.
//!
//! Priority at any position: reference token, `**strong**`, `*emphasis*`, `` `code` ``,
//! `[label](url)`. Reference tokens are atomic: closing delimiters are never searched for
//! inside one, so markup cannot split a token. Anything unmatched stays literal.

use crate::document::Inline;

const REF_OPEN: &str = "[[ref:";
const REF_CLOSE: &str = "]]";
const SAFE_SCHEMES: &[&str] = &["http://", "https://", "mailto:"];

/// Nesting past this depth renders delimiters literally.
const MAX_INLINE_DEPTH: usize = 16;

pub(crate) fn parse_inline(text: &str) -> Vec<Inline> {
    parse_at_depth(text, 0)
}

fn parse_at_depth(text: &str, depth: usize) -> Vec<Inline> {
    let mut spans = Spans::default();
    let nest = depth < MAX_INLINE_DEPTH;
    let closers = Closers::scan(text);
    let mut pos = 0usize;

    while pos < text.len() {
        let rest = &text[pos..];

        if let Some((path, len)) = match_reference(rest) {
            spans.push(Inline::reference(path));
            pos += len;
            continue;
        }

        if rest.starts_with("**") {
            match closers.strong_close(pos + 2).filter(|_| nest) {
                Some(close) => {
                    let content = parse_at_depth(&text[pos + 2..close], depth + 1);
                    spans.push(Inline::Strong { content });
                    pos = close + 2;
                }
                None => {
                    spans.push_str("**");
                    pos += 2;
                }
            }
            continue;
        }

        if rest.starts_with('*') {
            if let Some(close) = closers.emphasis_close(pos + 1).filter(|_| nest) {
                let content = parse_at_depth(&text[pos + 1..close], depth + 1);
                spans.push(Inline::Emphasis { content });
                pos = close + 1;
                continue;
            }
        } else if rest.starts_with('`') {
            if let Some(close) = find_code_close(text, pos + 1) {
                spans.push(Inline::Code {
                    code: text[pos + 1..close].to_string(),
                });
                pos = close + 1;
                continue;
            }
        } else if rest.starts_with('[') {
            if let Some((label, url, len)) = match_link(rest) {
                spans.push(Inline::Link {
                    label: label.to_string(),
                    url: url.to_string(),
                });
                pos += len;
                continue;
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        spans.push_char(ch);
        pos += ch.len_utf8();
    }

    spans.finish()
}

/// `[[ref:<path>]]` at the start of `rest`: the trimmed path and the token length.
///
/// The path may not contain `]` except where it closes a `[digits]` index group, so
/// `[[ref:logs[0].message]]` binds the whole path.
pub(crate) fn match_reference(rest: &str) -> Option<(&str, usize)> {
    let body = rest.strip_prefix(REF_OPEN)?;
    let end = indexed_identifier_end(body).or_else(|| plain_identifier_end(body))?;
    let path = body[..end].trim();
    if path.is_empty() {
        return None;
    }
    Some((path, REF_OPEN.len() + end + REF_CLOSE.len()))
}

fn indexed_identifier_end(body: &str) -> Option<usize> {
    let mut pos = 0usize;
    loop {
        let end = pos + body[pos..].find(']')?;
        if closes_index(&body[..end]) {
            pos = end + 1;
            continue;
        }
        return body[end..].starts_with(REF_CLOSE).then_some(end);
    }
}

fn plain_identifier_end(body: &str) -> Option<usize> {
    let end = body.find(']')?;
    body[end..].starts_with(REF_CLOSE).then_some(end)
}

fn closes_index(prefix: &str) -> bool {
    prefix.rfind('[').is_some_and(|open| {
        let digits = &prefix[open + 1..];
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    })
}

fn match_link(rest: &str) -> Option<(&str, &str, usize)> {
    let body = rest.strip_prefix('[')?;
    let label_end = body.find(']')?;
    let label = &body[..label_end];
    if label.trim().is_empty() || label.contains('\n') {
        return None;
    }
    let after = body[label_end + 1..].strip_prefix('(')?;
    let url_end = after.find(')')?;
    let url = after[..url_end].trim();
    if url.is_empty()
        || url.chars().any(char::is_whitespace)
        || url.contains(REF_OPEN)
        || !is_safe_url(url)
    {
        return None;
    }
    Some((label, url, 1 + label_end + 2 + url_end + 1))
}

fn is_safe_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    SAFE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Length of a span that closing-delimiter searches must step over whole.
fn atomic_len(text: &str, pos: usize) -> Option<usize> {
    let rest = &text[pos..];
    if let Some((_, len)) = match_reference(rest) {
        return Some(len);
    }
    if rest.starts_with('`') {
        return find_code_close(text, pos + 1).map(|close| close + 1 - pos);
    }
    None
}

/// Where the `**` and `*` closers are for every start offset of one text.
///
/// A closer search walks the text one step at a time, where a step skips an atomic span, a
/// complete strong span (emphasis only) or one character. Walks from different offsets merge
/// once they reach the same position, so one right-to-left pass stores the first closer on
/// the walk from every offset and each lookup afterwards is O(1).
struct Closers<'a> {
    text: &'a str,
    strong: Vec<Option<usize>>,
    emphasis: Vec<Option<usize>>,
    strong_step: Vec<usize>,
    emphasis_step: Vec<usize>,
}

impl<'a> Closers<'a> {
    fn scan(text: &'a str) -> Self {
        let len = text.len();
        let mut closers = Self {
            text,
            strong: vec![None; len + 1],
            emphasis: vec![None; len + 1],
            strong_step: vec![len; len + 1],
            emphasis_step: vec![len; len + 1],
        };

        for (pos, ch) in text.char_indices().rev() {
            let rest = &text[pos..];
            let atomic = atomic_len(text, pos);
            let step = pos + atomic.unwrap_or(ch.len_utf8());
            let plain = atomic.is_none();
            let double = plain && rest.starts_with("**");
            let tight = !ends_with_space(&text[..pos]);

            closers.strong_step[pos] = step;
            closers.strong[pos] = if double && tight {
                Some(pos)
            } else {
                closers.strong[step]
            };

            // A complete strong span inside emphasis is stepped over whole.
            let emphasis_step = if double {
                closers.strong_close(pos + 2).map_or(pos + 2, |close| close + 2)
            } else {
                step
            };
            closers.emphasis_step[pos] = emphasis_step;
            closers.emphasis[pos] = if plain && !double && rest.starts_with('*') && tight {
                Some(pos)
            } else {
                closers.emphasis[emphasis_step]
            };
        }
        closers
    }

    /// `**` closing a strong span whose content starts at `from`.
    fn strong_close(&self, from: usize) -> Option<usize> {
        if !starts_with_non_space(&self.text[from..]) {
            return None;
        }
        self.strong[self.strong_step[from]]
    }

    /// `*` closing an emphasis span whose content starts at `from`.
    fn emphasis_close(&self, from: usize) -> Option<usize> {
        if !starts_with_non_space(&self.text[from..]) {
            return None;
        }
        self.emphasis[self.emphasis_step[from]]
    }
}

fn find_code_close(text: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while pos < text.len() {
        let rest = &text[pos..];
        if let Some((_, len)) = match_reference(rest) {
            pos += len;
            continue;
        }
        if rest.starts_with('`') {
            return (pos > from).then_some(pos);
        }
        pos += char_len(rest);
    }
    None
}

fn starts_with_non_space(text: &str) -> bool {
    text.chars().next().is_some_and(|ch| !ch.is_whitespace())
}

fn ends_with_space(text: &str) -> bool {
    text.chars().next_back().map_or(true, char::is_whitespace)
}

fn char_len(rest: &str) -> usize {
    rest.chars().next().map_or(1, char::len_utf8)
}

/// Accumulates literal text and splits it on newlines into explicit line breaks.
#[derive(Default)]
struct Spans {
    out: Vec<Inline>,
    buf: String,
}

impl Spans {
    fn push(&mut self, inline: Inline) {
        self.flush();
        self.out.push(inline);
    }

    fn push_char(&mut self, ch: char) {
        if ch == '\n' {
            self.flush();
            self.out.push(Inline::LineBreak);
        } else {
            self.buf.push(ch);
        }
    }

    fn push_str(&mut self, text: &str) {
        text.chars().for_each(|ch| self.push_char(ch));
    }

    fn flush(&mut self) {
        if !self.buf.is_empty() {
            self.out.push(Inline::Text {
                text: std::mem::take(&mut self.buf),
            });
        }
    }

    fn finish(mut self) -> Vec<Inline> {
        self.flush();
        self.out
    }
}
