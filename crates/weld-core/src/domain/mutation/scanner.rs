//! Minimal structural scanner for generated Python sources.
//!
//! Knows just enough Python to find things reliably: string literals and
//! comments are skipped, brackets are balanced, top-level statements are
//! split with their decorators attached. Everything works on byte offsets
//! into the original text so edits can be spliced in place.

use std::collections::{BTreeSet, HashSet};

// ── CodeChars ────────────────────────────────────────────────────────────────

/// Characters of `src` outside string literals and comments.
///
/// Newlines terminating a comment are still yielded.
struct CodeChars<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> CodeChars<'a> {
    fn new(src: &'a str, start: usize) -> Self {
        Self { src, pos: start }
    }
}

impl Iterator for CodeChars<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.src.get(self.pos..)?;
            let c = rest.chars().next()?;
            let at = self.pos;

            match c {
                '#' => {
                    self.pos += rest.find('\n').unwrap_or(rest.len());
                }
                '"' | '\'' => {
                    let triple = if c == '"' { "\"\"\"" } else { "'''" };
                    if rest.starts_with(triple) {
                        let body = &rest[3..];
                        self.pos += 3 + body.find(triple).map_or(body.len(), |i| i + 3);
                    } else {
                        self.pos += 1 + string_len(&rest[1..], c);
                    }
                }
                _ => {
                    self.pos += c.len_utf8();
                    return Some((at, c));
                }
            }
        }
    }
}

/// Byte length of a single-line string body, closing quote included.
fn string_len(body: &str, quote: char) -> usize {
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '\n' => return i,
            c if c == quote && !escaped => return i + 1,
            _ => escaped = false,
        }
    }
    body.len()
}

/// Offset of the bracket closing the one at `open`.
pub fn matching_close(src: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in CodeChars::new(src, open) {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// ── Lines ────────────────────────────────────────────────────────────────────

pub fn line_start(src: &str, pos: usize) -> usize {
    src[..pos].rfind('\n').map_or(0, |i| i + 1)
}

/// Offset just past the newline ending the line that holds `pos`.
pub fn line_end(src: &str, pos: usize) -> usize {
    src[pos..].find('\n').map_or(src.len(), |i| pos + i + 1)
}

/// `(offset, line)` pairs for `src[start..end]`, newlines included.
pub fn lines_in(src: &str, start: usize, end: usize) -> Vec<(usize, &str)> {
    let mut offset = start;
    src[start..end]
        .split_inclusive('\n')
        .map(|line| {
            let at = offset;
            offset += line.len();
            (at, line)
        })
        .collect()
}

/// Replace `src[start..end]` with `with`.
pub fn splice(src: &str, start: usize, end: usize, with: &str) -> String {
    let mut out = String::with_capacity(src.len() + with.len());
    out.push_str(&src[..start]);
    out.push_str(with);
    out.push_str(&src[end..]);
    out
}

// ── Statements ───────────────────────────────────────────────────────────────

/// A top-level statement: `src[start..end]`, trailing blank lines excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement {
    pub start: usize,
    pub end: usize,
}

impl Statement {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    /// First line, without its newline.
    pub fn head<'a>(&self, src: &'a str) -> &'a str {
        self.text(src).lines().next().unwrap_or_default()
    }
}

/// Line-start offsets that sit at bracket depth zero outside any string.
fn top_level_line_starts(src: &str) -> HashSet<usize> {
    let mut starts = HashSet::from([0]);
    let mut depth = 0i32;
    for (i, c) in CodeChars::new(src, 0) {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '\n' if depth <= 0 => {
                starts.insert(i + 1);
            }
            _ => {}
        }
    }
    starts
}

/// Split `src` into top-level statements.
///
/// A statement opens on an unindented line at depth zero and runs until the
/// next one. Decorator lines open the statement they decorate.
pub fn statements(src: &str) -> Vec<Statement> {
    let starts = top_level_line_starts(src);
    let mut out: Vec<Statement> = Vec::new();
    let mut decorated = false;
    let mut offset = 0;

    for line in src.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        if line.trim().is_empty() {
            continue;
        }

        let opens = starts.contains(&start) && !line.starts_with(char::is_whitespace);
        match out.last_mut() {
            Some(last) if !opens || decorated => last.end = offset,
            _ => out.push(Statement { start, end: offset }),
        }
        if opens {
            decorated = line.starts_with('@');
        }
    }

    out
}

// ── Calls ────────────────────────────────────────────────────────────────────

/// Bracket offsets of a call's argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub open: usize,
    pub close: usize,
}

impl Call {
    pub fn args<'a>(&self, src: &'a str) -> &'a str {
        &src[self.open + 1..self.close]
    }
}

/// Find `target = callee(...)` at the top level.
pub fn find_assigned_call(src: &str, target: &str, callee: &str) -> Option<(Statement, Call)> {
    statements(src).into_iter().find_map(|stmt| {
        let rest = stmt
            .text(src)
            .strip_prefix(target)?
            .trim_start()
            .strip_prefix('=')?
            .trim_start()
            .strip_prefix(callee)?
            .trim_start();
        if !rest.starts_with('(') {
            return None;
        }
        let open = stmt.end - rest.len();
        let close = matching_close(src, open)?;
        Some((stmt, Call { open, close }))
    })
}

/// Find the first call to `callee` anywhere, skipping its definition.
pub fn find_call(src: &str, callee: &str) -> Option<Call> {
    let pattern = format!("{callee}(");
    let mut from = 0;

    while let Some(found) = src[from..].find(&pattern) {
        let at = from + found;
        from = at + pattern.len();

        let before = &src[line_start(src, at)..at];
        let boundary = before
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_' || c == '.'));
        let definition = before.trim_end().ends_with("def");
        let commented = before.trim_start().starts_with('#');
        if !boundary || definition || commented {
            continue;
        }

        let open = at + callee.len();
        if let Some(close) = matching_close(src, open) {
            return Some(Call { open, close });
        }
    }
    None
}

/// Find the list passed as `keyword=[...]` inside a call's arguments.
pub fn find_keyword_list(src: &str, call: Call, keyword: &str) -> Option<Call> {
    let args = call.args(src);
    let mut from = 0;
    while let Some(found) = args[from..].find(keyword) {
        let at = from + found;
        from = at + keyword.len();

        let boundary = args[..at]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        let Some(rest) = args[from..].trim_start().strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        if boundary && rest.starts_with('[') {
            let open = call.open + 1 + args.len() - rest.len();
            let close = matching_close(src, open)?;
            return Some(Call { open, close });
        }
    }
    None
}

// ── Imports ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ImportGroup {
    Stdlib,
    ThirdParty,
    Local,
}

const STDLIB: &[&str] = &[
    "asyncio",
    "collections",
    "contextlib",
    "dataclasses",
    "datetime",
    "enum",
    "functools",
    "json",
    "logging",
    "os",
    "pathlib",
    "re",
    "sys",
    "typing",
    "uuid",
];

/// Root package of generated code.
const LOCAL_PACKAGE: &str = "app";

#[derive(Debug)]
struct Import<'a> {
    start: usize,
    end: usize,
    module: &'a str,
    from: bool,
    /// Imported names of a single-line `from` import; `None` when the
    /// statement cannot be merged into.
    names: Option<Vec<&'a str>>,
}

impl Import<'_> {
    fn group(&self) -> ImportGroup {
        let root = self.module.split('.').next().unwrap_or_default();
        if root == LOCAL_PACKAGE {
            ImportGroup::Local
        } else if STDLIB.contains(&root) {
            ImportGroup::Stdlib
        } else {
            ImportGroup::ThirdParty
        }
    }

    fn sort_key(&self) -> (bool, String) {
        (self.from, self.module.to_ascii_lowercase())
    }
}

fn parse_import(text: &str, start: usize, end: usize) -> Option<Import<'_>> {
    let line = text.trim_end();
    if let Some(rest) = line.strip_prefix("from ") {
        let (module, names) = rest.split_once(" import ")?;
        let names = names.trim();
        let mergeable = !line.contains('\n') && !names.starts_with('(') && !names.contains(" as ");
        return Some(Import {
            start,
            end,
            module: module.trim(),
            from: true,
            names: mergeable.then(|| {
                names
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .collect()
            }),
        });
    }

    let module = line.strip_prefix("import ")?.split([' ', ',']).next()?;
    Some(Import {
        start,
        end,
        module,
        from: false,
        names: None,
    })
}

fn imports(src: &str) -> Vec<Import<'_>> {
    statements(src)
        .into_iter()
        .filter_map(|s| parse_import(s.text(src), s.start, s.end))
        .collect()
}

/// Ensure `line` is imported, keeping groups and sort order.
///
/// A `from` import of an already-imported module is merged into the
/// existing statement. Groups are stdlib, third-party and `app.`, separated
/// by one blank line; a missing group is created in its place.
pub fn ensure_import(src: &str, line: &str) -> String {
    let existing = imports(src);
    if existing.iter().any(|i| src[i.start..i.end].trim_end() == line) {
        return src.to_string();
    }
    let Some(wanted) = parse_import(line, 0, line.len()) else {
        return src.to_string();
    };

    if let Some(new_names) = wanted.names.as_ref().filter(|_| wanted.from) {
        let target = existing
            .iter()
            .find(|i| i.from && i.module == wanted.module && i.names.is_some());
        if let Some(target) = target {
            let current = target.names.as_deref().unwrap_or_default();
            if new_names.iter().all(|n| current.contains(n)) {
                return src.to_string();
            }
            let merged: BTreeSet<&str> = current.iter().chain(new_names).copied().collect();
            let merged: Vec<&str> = merged.into_iter().collect();
            let rewritten = format!("from {} import {}\n", wanted.module, merged.join(", "));
            return splice(src, target.start, target.end, &rewritten);
        }
    }

    let group = wanted.group();
    let key = wanted.sort_key();
    let same: Vec<&Import> = existing.iter().filter(|i| i.group() == group).collect();

    if let Some(next) = same.iter().find(|i| i.sort_key() > key) {
        splice(src, next.start, next.start, &format!("{line}\n"))
    } else if let Some(last) = same.last() {
        splice(src, last.end, last.end, &format!("{line}\n"))
    } else if let Some(next) = existing.iter().find(|i| i.group() > group) {
        splice(src, next.start, next.start, &format!("{line}\n\n"))
    } else if let Some(last) = existing.last() {
        splice(src, last.end, last.end, &format!("\n{line}\n"))
    } else {
        format!("{line}\n\n{src}")
    }
}

/// Insert a top-level block after the statement ending at `end`, separated
/// by two blank lines on each side.
pub fn insert_block_after(src: &str, end: usize, block: &str) -> String {
    let rest = &src[end..];
    let tail = if rest.is_empty() || rest.starts_with('\n') {
        ""
    } else {
        "\n\n"
    };
    splice(
        src,
        end,
        end,
        &format!("\n\n{}\n{tail}", block.trim_end_matches('\n')),
    )
}
