//! Lexical signal extraction.
//!
//! Scans raw source text (any language) with a fixed set of regex probes and
//! produces an ordered [`HintSet`] plus the cleaned leading comment block.
//! Nothing here parses code: every probe is a pattern match over the first
//! `scan_chars` characters of the file, so results are heuristic by nature.
//!
//! Probe order is part of the contract. Hints are appended in the order the
//! probes are listed in [`Hint::PROBE_ORDER`], each at most once, and the
//! nested-loop hint is appended last after a separate structural pass.

use regex::Regex;
use std::sync::OnceLock;

/// Default number of characters inspected per file.
pub const DEFAULT_SCAN_CHARS: usize = 20_000;

/// Only the first lines of a file are considered for the leading comment.
const COMMENT_SCAN_LINES: usize = 40;

/// Width a tab counts for when comparing indentation.
const TAB_WIDTH: usize = 4;

/// A single detected lexical signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hint {
    BinarySearch,
    Sorting,
    InPlaceSwap,
    Dfs,
    Bfs,
    DynamicProgramming,
    UnionFind,
    Heap,
    Recursive,
    NestedLoops,
}

impl Hint {
    /// Probes run over the snippet in this order. `NestedLoops` is not a
    /// regex probe and is handled after the main pass.
    pub const PROBE_ORDER: [Hint; 9] = [
        Hint::BinarySearch,
        Hint::Sorting,
        Hint::InPlaceSwap,
        Hint::Dfs,
        Hint::Bfs,
        Hint::DynamicProgramming,
        Hint::UnionFind,
        Hint::Heap,
        Hint::Recursive,
    ];

    /// Human-readable tag; also what the title classifier matches against.
    pub fn tag(&self) -> &'static str {
        match self {
            Hint::BinarySearch => "binary search",
            Hint::Sorting => "sorting",
            Hint::InPlaceSwap => "in-place swap",
            Hint::Dfs => "dfs",
            Hint::Bfs => "bfs",
            Hint::DynamicProgramming => "dynamic programming",
            Hint::UnionFind => "union-find",
            Hint::Heap => "priority_queue / heap",
            Hint::Recursive => "recursive",
            Hint::NestedLoops => "nested loops",
        }
    }
}

/// Ordered sequence of detected hints. Insertion order is detection order and
/// no hint appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintSet {
    hints: Vec<Hint>,
}

impl HintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hint unless it is already present.
    pub fn push(&mut self, hint: Hint) {
        if !self.hints.contains(&hint) {
            self.hints.push(hint);
        }
    }

    pub fn contains(&self, hint: Hint) -> bool {
        self.hints.contains(&hint)
    }

    pub fn first(&self) -> Option<Hint> {
        self.hints.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Hint> + '_ {
        self.hints.iter().copied()
    }

    /// Tags joined with `", "` and lower-cased.
    pub fn joined(&self) -> String {
        self.hints
            .iter()
            .map(|h| h.tag())
            .collect::<Vec<_>>()
            .join(", ")
            .to_lowercase()
    }
}

impl FromIterator<Hint> for HintSet {
    fn from_iter<I: IntoIterator<Item = Hint>>(iter: I) -> Self {
        let mut set = HintSet::new();
        for hint in iter {
            set.push(hint);
        }
        set
    }
}

/// Everything the downstream components need from one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals {
    pub hints: HintSet,
    /// Cleaned leading comment; empty when absent or a directive block.
    pub top_comment: String,
    /// The scanned prefix of the source text.
    pub snippet: String,
}

impl Signals {
    pub fn nested_loops(&self) -> bool {
        self.hints.contains(Hint::NestedLoops)
    }
}

struct ProbeSet {
    binary_search: Regex,
    sorting: Regex,
    swap: Regex,
    dfs: Regex,
    bfs: Regex,
    dp: Regex,
    union_find: Regex,
    heap: Regex,
    recursion_keyword: Regex,
    function_name: Regex,
    return_expr: Regex,
    for_line: Regex,
    directive: Regex,
    author_label: Regex,
}

static PROBES: OnceLock<ProbeSet> = OnceLock::new();

impl ProbeSet {
    fn new() -> Self {
        Self {
            // Deliberately broad: bare boundary names fire too.
            binary_search: Regex::new(r"(?i)\b(?:binary\w*|binarysearch|mid|left|right|low|high)\b")
                .expect("binary_search regex must compile"),
            sorting: Regex::new(
                r"(?i)\b(?:sort|sorted|qsort|sort_by|sort_by_key|sort_unstable)\b|[A-Za-z_]*sort[A-Za-z_]*\s*\(",
            )
            .expect("sorting regex must compile"),
            swap: Regex::new(r"(?i)\bswap\w*\b|\b(?:temp|tmp)\b")
                .expect("swap regex must compile"),
            dfs: Regex::new(r"(?i)\bdfs\w*|depth[-_ ]?first").expect("dfs regex must compile"),
            bfs: Regex::new(r"(?i)\bbfs\w*|breadth[-_ ]?first").expect("bfs regex must compile"),
            dp: Regex::new(r"(?i)\bdp\b|memo|dynamic[-_ ]?programming")
                .expect("dp regex must compile"),
            union_find: Regex::new(r"(?i)union[-_ ]?find|disjoint[-_ ]?set|\bdsu\b")
                .expect("union_find regex must compile"),
            heap: Regex::new(r"(?i)priority_?queue|\bheapq\b|\bheapify\b|binaryheap|\bheap\b")
                .expect("heap regex must compile"),
            recursion_keyword: Regex::new(r"(?i)\brecurs\w*")
                .expect("recursion_keyword regex must compile"),
            // def f(  fn f(  function f(  func f(  and C-family `int f(...) {`
            function_name: Regex::new(
                r"(?:\b(?:def|fn|function|func)\s+([A-Za-z_]\w*)\s*[(<])|(?:^\s*(?:[\w:<>,\*&\[\]]+\s+)+([A-Za-z_]\w*)\s*\([^;{}]*\)\s*(?:const\s*)?\{?\s*$)",
            )
            .expect("function_name regex must compile"),
            return_expr: Regex::new(r"\breturn\b([^;\n]*)").expect("return_expr regex must compile"),
            for_line: Regex::new(r"^(?:for|foreach)\b").expect("for_line regex must compile"),
            directive: Regex::new(
                r"^#\s*(?:include|pragma|define|ifndef|ifdef|if|endif|import|undef)\b|^#!|^#\[",
            )
            .expect("directive regex must compile"),
            author_label: Regex::new(r"(?i)^@?author\s*:").expect("author_label regex must compile"),
        }
    }
}

fn probes() -> &'static ProbeSet {
    PROBES.get_or_init(ProbeSet::new)
}

/// Cut `text` to its first `max_chars` characters.
pub fn scan_window(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Run every probe over the first `max_chars` characters of `text`.
pub fn extract_signals(text: &str, max_chars: usize) -> Signals {
    let snippet = scan_window(text, max_chars);
    let p = probes();

    let mut hints = HintSet::new();
    for hint in Hint::PROBE_ORDER {
        let fired = match hint {
            Hint::BinarySearch => p.binary_search.is_match(snippet),
            Hint::Sorting => p.sorting.is_match(snippet),
            Hint::InPlaceSwap => p.swap.is_match(snippet),
            Hint::Dfs => p.dfs.is_match(snippet),
            Hint::Bfs => p.bfs.is_match(snippet),
            Hint::DynamicProgramming => p.dp.is_match(snippet),
            Hint::UnionFind => p.union_find.is_match(snippet),
            Hint::Heap => p.heap.is_match(snippet),
            Hint::Recursive => {
                p.recursion_keyword.is_match(snippet) || has_self_recursive_return(snippet)
            }
            Hint::NestedLoops => false,
        };
        if fired {
            hints.push(hint);
        }
    }

    if has_nested_loops(snippet) {
        hints.push(Hint::NestedLoops);
    }

    tracing::debug!(hints = %hints.joined(), "extracted signals");

    Signals {
        hints,
        top_comment: top_comment(snippet),
        snippet: snippet.to_string(),
    }
}

/// Whether some function returns an expression that calls the function itself.
///
/// Function headers come from `def`/`fn`/`function`/`func` and C-family
/// signatures; each `return` is attributed to the most recent header above it.
/// Only `return` expressions are inspected, so tail calls written as bare
/// expressions (Rust, Scala) are missed.
pub fn has_self_recursive_return(text: &str) -> bool {
    let p = probes();
    let mut current: Option<&str> = None;
    for line in text.lines() {
        if let Some(name) = function_header(line) {
            current = Some(name);
        }
        let Some(name) = current else {
            continue;
        };
        let recursive = p.return_expr.captures_iter(line).any(|c| {
            let expr = c.get(1).map(|m| m.as_str()).unwrap_or_default();
            calls(expr, name)
        });
        if recursive {
            return true;
        }
    }
    false
}

/// Name declared by a function header on this line, if any.
fn function_header(line: &str) -> Option<&str> {
    let caps = probes().function_name.captures(line)?;
    let leading = caps
        .get(0)
        .map(|m| m.as_str().trim_start())
        .unwrap_or_default();
    let first_word = leading
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or_default();
    if is_statement_keyword(first_word) {
        return None;
    }
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .filter(|name| !is_statement_keyword(name))
}

fn is_statement_keyword(word: &str) -> bool {
    matches!(
        word,
        "if" | "for"
            | "while"
            | "switch"
            | "catch"
            | "return"
            | "else"
            | "new"
            | "throw"
            | "await"
            | "yield"
            | "case"
            | "delete"
            | "sizeof"
            | "main"
    )
}

/// `expr` contains `name(` where `name` is not the tail of a longer identifier.
fn calls(expr: &str, name: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = expr[start..].find(name) {
        let at = start + pos;
        let before_ok = expr[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        let after = expr[at + name.len()..].trim_start();
        if before_ok && after.starts_with('(') {
            return true;
        }
        start = at + name.len();
    }
    false
}

enum LoopScope {
    /// Brace-delimited body; `depth` is the brace depth of the header line.
    Brace { depth: usize, open: bool },
    /// Indentation-delimited body (`for x in y:`).
    Indent { indent: usize },
}

/// Detect a `for` loop textually nested inside another `for` loop.
///
/// Tracks brace depth for C-family code and indentation for `:`-terminated
/// headers. Loops on a single line (`for (...) { ... }`, `for (...) x++;`,
/// `for x in a: f(x)`) and two headers on one line are ignored, which trades
/// recall for few false positives.
pub fn has_nested_loops(text: &str) -> bool {
    let p = probes();
    let mut depth: usize = 0;
    let mut stack: Vec<LoopScope> = Vec::new();

    for raw in text.lines() {
        let code = strip_line_comment(raw);
        let trimmed = code.trim();
        if trimmed.is_empty()
            || trimmed.starts_with('*')
            || trimmed.starts_with("/*")
            || trimmed.starts_with('#')
        {
            continue;
        }
        let indent = indentation(raw);
        let depth_before = depth;

        stack.retain(|scope| match scope {
            LoopScope::Indent { indent: i } => indent > *i,
            LoopScope::Brace { depth: d, open } => !*open || depth_before > *d,
        });

        let is_for = p.for_line.is_match(trimmed);
        if is_for && !stack.is_empty() {
            return true;
        }

        for c in trimmed.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        // A pending header either opened its body on this line or this line
        // was its single-statement body.
        stack.retain_mut(|scope| match scope {
            LoopScope::Brace { depth: d, open } if !*open => {
                if depth > *d {
                    *open = true;
                    true
                } else {
                    false
                }
            }
            _ => true,
        });

        if is_for {
            if trimmed.ends_with(':') {
                stack.push(LoopScope::Indent { indent });
            } else if depth > depth_before {
                stack.push(LoopScope::Brace {
                    depth: depth_before,
                    open: true,
                });
            } else if bare_loop_header(trimmed) {
                // Body on the next line, braced or not.
                stack.push(LoopScope::Brace {
                    depth: depth_before,
                    open: false,
                });
            }
        }
    }
    false
}

/// `for (...)` with nothing after the closing parenthesis.
fn bare_loop_header(trimmed: &str) -> bool {
    let rest = trimmed
        .trim_start_matches("foreach")
        .trim_start_matches("for")
        .trim_start();
    if !rest.starts_with('(') {
        return false;
    }
    let mut open = 0usize;
    for (i, c) in rest.char_indices() {
        match c {
            '(' => open += 1,
            ')' => {
                open = open.saturating_sub(1);
                if open == 0 {
                    return rest[i + 1..].trim().is_empty();
                }
            }
            _ => {}
        }
    }
    false
}

fn strip_line_comment(line: &str) -> &str {
    let mut cut = line.len();
    if let Some(pos) = line.find("//") {
        cut = cut.min(pos);
    }
    // `#` starts a comment in Python/shell, but not a C directive at column 0.
    if let Some(pos) = line.find(" #") {
        cut = cut.min(pos);
    }
    &line[..cut]
}

fn indentation(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// Extract the cleaned leading comment block.
///
/// Looks at the first lines of the file for either a block comment
/// (`/* */`, `"""`, `'''`) or a run of line comments (`//`, `#`, `--`, `;`).
/// A block whose first line is an include/pragma/define style directive is
/// discarded. Comment markers are stripped from every line and the result is
/// trimmed.
pub fn top_comment(text: &str) -> String {
    let lines: Vec<&str> = text.lines().take(COMMENT_SCAN_LINES).collect();
    let Some(start) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return String::new();
    };

    let first = lines[start].trim_start();
    let block: Vec<&str> = if let Some(close) = block_delimiter(first) {
        let mut collected = Vec::new();
        for (i, line) in lines[start..].iter().enumerate() {
            collected.push(*line);
            let body = if i == 0 {
                &line.trim_start()[close.0.len()..]
            } else {
                line
            };
            if body.contains(close.1) {
                break;
            }
        }
        collected
    } else if line_comment_marker(first).is_some() {
        // A directive ends the run (`// Two Sum` then `#include <vector>`).
        let rest = lines[start + 1..].iter().take_while(|l| {
            let l = l.trim_start();
            line_comment_marker(l).is_some() && !probes().directive.is_match(l)
        });
        std::iter::once(&lines[start]).chain(rest).copied().collect()
    } else {
        return String::new();
    };

    if probes().directive.is_match(block[0].trim_start()) {
        return String::new();
    }

    let cleaned: Vec<String> = block.iter().map(|l| strip_comment_markers(l)).collect();
    cleaned.join("\n").trim().to_string()
}

/// Opening and closing delimiters for the block comment starting `line`.
fn block_delimiter(line: &str) -> Option<(&'static str, &'static str)> {
    [("/*", "*/"), ("\"\"\"", "\"\"\""), ("'''", "'''")]
        .into_iter()
        .find(|(open, _)| line.starts_with(open))
}

fn line_comment_marker(line: &str) -> Option<&'static str> {
    ["///", "//!", "//", "#", "--", ";"]
        .into_iter()
        .find(|m| line.starts_with(m))
}

fn strip_comment_markers(line: &str) -> String {
    let mut s = line.trim();
    for marker in ["/**", "/*", "*/", "\"\"\"", "'''"] {
        s = s.trim_start_matches(marker).trim();
        s = s.trim_end_matches(marker).trim();
    }
    if let Some(m) = line_comment_marker(s) {
        s = s[m.len()..].trim();
    }
    s.trim_start_matches('*').trim().to_string()
}

/// Whether the first comment line is an `author:` label rather than a title.
pub fn is_author_line(line: &str) -> bool {
    probes().author_label.is_match(line.trim())
}
