/// Greedy word wrapping with a hanging indent, measured in terminal columns.
///
/// Text is cut into words and whitespace runs; a word also breaks after a
/// hyphen joining two runs of letters (`non-alcoholic` → `non-` `alcoholic`).
/// Each whitespace character becomes one space and internal runs are kept;
/// whitespace at the start or end of a line is dropped. A word wider than a
/// whole line is split across lines, first filling the room left on the
/// current one.
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    /// A run of this many whitespace characters.
    Space(usize),
    Word(&'a str),
}

impl Chunk<'_> {
    fn width(self) -> usize {
        match self {
            Self::Space(n) => n,
            Self::Word(w) => w.width(),
        }
    }
}

/// Wrap `text` to `width` display columns.
///
/// The first line starts with `initial_indent`, every following line with
/// `subsequent_indent`. Each line gets at least one character of content even
/// when the indent alone is as wide as `width`. Blank text yields no lines.
#[must_use]
pub fn wrap(text: &str, width: usize, initial_indent: &str, subsequent_indent: &str) -> Vec<String> {
    // Reversed so the next chunk is always `last()`.
    let mut pending: Vec<Chunk<'_>> = chunks(text).into_iter().rev().collect();
    let mut lines = Vec::new();
    let mut indent = initial_indent;

    while !pending.is_empty() {
        let avail = width.saturating_sub(indent.width()).max(1);
        if let Some(Chunk::Space(_)) = pending.last() {
            pending.pop();
        }

        let mut line: Vec<Chunk<'_>> = Vec::new();
        let mut line_width = 0;
        while let Some(&chunk) = pending.last() {
            let w = chunk.width();
            if line_width + w > avail {
                break;
            }
            line.push(chunk);
            line_width += w;
            pending.pop();
        }

        if let Some(&Chunk::Word(word)) = pending.last() {
            if word.width() > avail {
                let split = split_at_width(word, avail - line_width, line.is_empty());
                if split > 0 {
                    line.push(Chunk::Word(&word[..split]));
                    if let Some(last) = pending.last_mut() {
                        *last = Chunk::Word(&word[split..]);
                    }
                    if split == word.len() {
                        pending.pop();
                    }
                }
            }
        }

        if let Some(Chunk::Space(_)) = line.last() {
            line.pop();
        }
        if !line.is_empty() {
            let mut out = String::from(indent);
            for chunk in line {
                match chunk {
                    Chunk::Space(n) => out.extend(std::iter::repeat_n(' ', n)),
                    Chunk::Word(w) => out.push_str(w),
                }
            }
            lines.push(out);
            indent = subsequent_indent;
        }
    }
    lines
}

/// Split `text` into words and whitespace runs, breaking words after
/// inner hyphens.
fn chunks(text: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(first) = rest.chars().next() {
        if first.is_whitespace() {
            let end = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
            out.push(Chunk::Space(rest[..end].chars().count()));
            rest = &rest[end..];
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let mut word = &rest[..end];
            while let Some(cut) = hyphen_break(word) {
                out.push(Chunk::Word(&word[..cut]));
                word = &word[cut..];
            }
            out.push(Chunk::Word(word));
            rest = &rest[end..];
        }
    }
    out
}

/// Byte offset just past the first hyphen in `word` that has two
/// alphanumerics before it and one after it.
fn hyphen_break(word: &str) -> Option<usize> {
    let chars: Vec<(usize, char)> = word.char_indices().collect();
    (2..chars.len().saturating_sub(1)).find_map(|i| {
        let (at, c) = chars[i];
        let joins = c == '-'
            && chars[i - 1].1.is_alphanumeric()
            && chars[i - 2].1.is_alphanumeric()
            && chars[i + 1].1.is_alphanumeric();
        joins.then_some(at + 1)
    })
}

/// Byte offset of the longest prefix of `word` at most `columns` wide. When
/// `force` is set at least one character is taken, so a glyph wider than the
/// whole line still makes progress.
fn split_at_width(word: &str, columns: usize, force: bool) -> usize {
    let mut used = 0;
    for (i, c) in word.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > columns {
            return if i == 0 && force { c.len_utf8() } else { i };
        }
        used += w;
    }
    word.len()
}
