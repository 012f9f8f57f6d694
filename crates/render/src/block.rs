//! Block segmentation: a line scan that splits commentary on blank lines, lifts fenced code
//! out whole and gives every heading line a block of its own.

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawBlock<'a> {
    Fence {
        language: Option<String>,
        code: String,
    },
    Lines(Vec<&'a str>),
}

pub(crate) fn segment(text: &str) -> Vec<RawBlock<'_>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut chunk: Vec<&str> = Vec::new();
    let mut i = 0usize;

    while i < lines.len() {
        let line = lines[i];

        if let Some(opener) = fence_opener(line) {
            if let Some(close) = find_fence_close(&lines, i + 1) {
                flush(&mut chunk, &mut blocks);
                blocks.push(fence_block(opener, &lines[i + 1..close]));
                // Text after a closing fence starts a fresh block.
                let trailing = fence_opener(lines[close]).map_or("", str::trim);
                if !trailing.is_empty() {
                    chunk.push(trailing);
                }
                i = close + 1;
                continue;
            }
            // Unterminated fence: plain text.
        }

        if line.trim().is_empty() {
            flush(&mut chunk, &mut blocks);
        } else if parse_heading(line).is_some() {
            flush(&mut chunk, &mut blocks);
            blocks.push(RawBlock::Lines(vec![line]));
        } else {
            chunk.push(line);
        }
        i += 1;
    }

    flush(&mut chunk, &mut blocks);
    blocks
}

fn flush<'a>(chunk: &mut Vec<&'a str>, blocks: &mut Vec<RawBlock<'a>>) {
    if !chunk.is_empty() {
        blocks.push(RawBlock::Lines(std::mem::take(chunk)));
    }
}

/// Text after the three backticks when `line` opens or closes a fence.
fn fence_opener(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix(FENCE)
}

fn find_fence_close(lines: &[&str], from: usize) -> Option<usize> {
    (from..lines.len()).find(|&i| fence_opener(lines[i]).is_some())
}

fn fence_block(opener: &str, body: &[&str]) -> RawBlock<'static> {
    let opener = opener.trim();
    let (language, first_line) = match opener.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (opener, ""),
    };

    let mut code_lines: Vec<&str> = Vec::with_capacity(body.len() + 1);
    if !first_line.is_empty() {
        code_lines.push(first_line);
    }
    code_lines.extend(body.iter().copied());
    let start = code_lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(code_lines.len());

    RawBlock::Fence {
        language: (!language.is_empty()).then(|| language.to_string()),
        code: code_lines[start..].join("\n").trim_end().to_string(),
    }
}

/// `#`-run length and heading text for lines like `## Title`.
pub(crate) fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let content = rest.trim();
    if content.is_empty() {
        return None;
    }
    u8::try_from(hashes).ok().map(|level| (level, content))
}

/// Item text for `- item` / `* item` lines.
pub(crate) fn strip_bullet(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(['-', '*'])?;
    rest.starts_with([' ', '\t']).then(|| rest.trim_start())
}
