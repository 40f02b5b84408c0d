//! Note assembly and normalization.
//!
//! [`heuristic_note`] runs the whole local pipeline in a fixed order:
//!
//! ```text
//! source ──▶ extract_signals ──▶ { hints, top comment }
//!                                    │
//!        ┌──────────┬────────────┬───┴────────┬──────────────┬───────────┐
//!        ▼          ▼            ▼            ▼              ▼           ▼
//!     title    pseudocode   complexity   edge cases     examples   explanation
//!        └──────────┴────────────┴────────────┴──────────────┴───────────┘
//!                                    ▼
//!                              normalize ──▶ Note
//! ```
//!
//! [`normalize`] is shared with the generative path: whatever produced the
//! note, every field leaves here with its documented type and shape.

use serde_json::Value;

use crate::classify::{self, Family, TITLE_NOT_INFERRED};
use crate::complexity;
use crate::config::LimitsConfig;
use crate::edge_cases;
use crate::explain;
use crate::models::{normalize_language, Example, Note, SourceUnit};
use crate::pseudocode;
use crate::signals::{extract_signals, scan_window};

/// Appended to stored code that exceeded the character budget.
pub const TRUNCATION_MARKER: &str = "\n/* ... truncated ... */";

/// Used when no problem statement could be derived.
pub const PROBLEM_NOT_INFERRED: &str = "Problem statement not inferred (heuristic mode).";

/// Extensions stripped from titles.
const SOURCE_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cxx", "h", "hpp", "py", "js", "jsx", "ts", "tsx", "java", "kt", "rs", "go",
    "rb", "swift", "cs", "php", "scala", "m", "txt", "md",
];

/// Build a note from local pattern detection only. Never fails.
pub fn heuristic_note(unit: &SourceUnit, limits: &LimitsConfig) -> Note {
    let signals = extract_signals(&unit.text, limits.scan_chars);
    let hints = &signals.hints;
    let family = classify::classify(hints);

    let title = classify::infer_title(hints, &signals.top_comment);
    let pseudocode = pseudocode::synthesize(hints);
    let complexity = complexity::estimate(hints, signals.nested_loops());
    let edge_cases = edge_cases::collect_edge_cases(&signals.snippet, hints);
    let examples = edge_cases::select_examples(hints);
    let explanation = explain::compose(&title, hints);

    let problem = if signals.top_comment.is_empty() {
        family
            .map(problem_statement)
            .unwrap_or(PROBLEM_NOT_INFERRED)
            .to_string()
    } else {
        signals.top_comment.clone()
    };

    let approach = if hints.is_empty() {
        String::new()
    } else {
        let line = family.map(approach_line).unwrap_or(
            "No single algorithm family dominates; the outline below is generic.",
        );
        format!("Detected signals: {}. {}", hints.joined(), line)
    };

    let note = Note {
        title,
        language: unit.language.clone(),
        problem,
        approach,
        pseudocode,
        complexity,
        edge_cases,
        examples,
        explanation,
        code: unit.text.clone(),
    };
    normalize(note, &unit.name, limits.max_code_chars)
}

fn problem_statement(family: Family) -> &'static str {
    match family {
        Family::BinarySearch => "Find a target value, or the boundary where a monotonic condition flips, in a sorted sequence.",
        Family::SelectionSort => "Sort a sequence of values into non-decreasing order.",
        Family::Sorting => "Reorder the input, or derive the answer from its sorted order.",
        Family::GraphTraversal => "Visit every node reachable in a graph or grid, optionally across all components.",
        Family::DynamicProgramming => "Compute an optimal value or a count defined by overlapping subproblems.",
        Family::UnionFind => "Maintain a partition of elements into disjoint sets under union and connectivity queries.",
        Family::Heap => "Repeatedly take the smallest or largest remaining element, for example to find the top k items.",
        Family::DivideAndConquer => "Solve the problem by reducing it to smaller instances of itself.",
        Family::Quadratic => "Examine every pair of input elements to compute the answer.",
    }
}

fn approach_line(family: Family) -> &'static str {
    match family {
        Family::BinarySearch => "Halve a sorted search window around mid until the target or boundary is found.",
        Family::SelectionSort => "Repeatedly select the minimum of the unsorted suffix and swap it into place.",
        Family::Sorting => "Sort first, then scan the ordered data.",
        Family::GraphTraversal => "Traverse the graph while tracking visited nodes.",
        Family::DynamicProgramming => "Fill a table of states from the base cases, reusing stored sub-results.",
        Family::UnionFind => "Track set representatives with path compression and union by rank.",
        Family::Heap => "Keep candidates in a priority queue and pop the best one each step.",
        Family::DivideAndConquer => "Recurse on smaller subproblems and combine their results.",
        Family::Quadratic => "Compare elements pairwise with two nested loops.",
    }
}

/// Coerce every field to its documented shape.
///
/// Applied to heuristic and generated notes alike: whitespace is tidied, the
/// title loses any file extension and falls back to `fallback_title`, empty
/// problems get [`PROBLEM_NOT_INFERRED`], edge cases are deduplicated,
/// meaningless examples are dropped and `code` is truncated to
/// `max_code_chars`.
pub fn normalize(note: Note, fallback_title: &str, max_code_chars: usize) -> Note {
    let mut title = strip_extension(&collapse_whitespace(&note.title));
    if title.is_empty() {
        title = strip_extension(&collapse_whitespace(fallback_title));
    }
    if title.is_empty() {
        title = TITLE_NOT_INFERRED.to_string();
    }

    let mut problem = tidy_prose(&note.problem);
    if problem.is_empty() {
        problem = PROBLEM_NOT_INFERRED.to_string();
    }

    let examples = note
        .examples
        .into_iter()
        .map(|e| Example {
            input: e.input.trim().to_string(),
            output: e.output.trim().to_string(),
            note: collapse_whitespace(&e.note),
        })
        .filter(Example::is_meaningful)
        .collect();

    Note {
        title,
        language: normalize_language(&note.language),
        problem,
        approach: tidy_prose(&note.approach),
        pseudocode: tidy_block(&note.pseudocode),
        complexity: collapse_whitespace(&note.complexity),
        edge_cases: dedupe_cases(note.edge_cases),
        examples,
        explanation: tidy_prose(&note.explanation),
        code: truncate_code(&note.code, max_code_chars),
    }
}

/// Keep the first `max_chars` characters and append [`TRUNCATION_MARKER`]
/// when anything was cut. Already-truncated text is returned unchanged.
pub fn truncate_code(code: &str, max_chars: usize) -> String {
    if let Some(body) = code.strip_suffix(TRUNCATION_MARKER) {
        if body.chars().count() <= max_chars {
            return code.to_string();
        }
    }
    let kept = scan_window(code, max_chars);
    if kept.len() == code.len() {
        code.to_string()
    } else {
        format!("{}{}", kept, TRUNCATION_MARKER)
    }
}

/// Drop a trailing source-file extension (`two_sum.cpp` → `two_sum`).
pub fn strip_extension(title: &str) -> String {
    match title.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) =>
        {
            stem.trim().to_string()
        }
        _ => title.trim().to_string(),
    }
}

/// Trim, drop empties and drop case-insensitive duplicates, keeping the first.
pub fn dedupe_cases(cases: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(cases.len());
    let mut out = Vec::with_capacity(cases.len());
    for case in cases {
        let case = collapse_whitespace(&case);
        if case.is_empty() {
            continue;
        }
        let key = case.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(case);
        }
    }
    out
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Right-trim lines, squeeze runs of blank lines to one, drop leading and
/// trailing blank lines. Indentation is preserved.
fn tidy_block(s: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in s.lines().map(str::trim_end) {
        if line.is_empty() && out.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

fn tidy_prose(s: &str) -> String {
    tidy_block(s).trim().to_string()
}

impl Note {
    /// Build a note from arbitrary generator JSON. See [`note_from_value`].
    pub fn from_value(value: &Value) -> Self {
        note_from_value(value)
    }
}

/// Build a [`Note`] from arbitrary JSON, coercing every field.
///
/// Strings pass through; numbers and booleans are stringified; arrays are
/// joined by newlines; objects are pretty-printed; null or absent becomes
/// empty. Both camelCase and snake_case keys are accepted.
pub fn note_from_value(value: &Value) -> Note {
    Note {
        title: text_field(value, &["title", "name"]),
        language: text_field(value, &["language", "lang"]),
        problem: text_field(value, &["problem", "problemStatement", "problem_statement"]),
        approach: text_field(value, &["approach", "intuition"]),
        pseudocode: text_field(value, &["pseudocode", "pseudoCode", "pseudo_code"]),
        complexity: complexity_field(value),
        edge_cases: string_list(field(value, &["edgeCases", "edge_cases"])),
        examples: example_list(field(value, &["examples", "example"])),
        explanation: text_field(value, &["explanation", "explain"]),
        code: text_field(value, &["code"]),
    }
}

fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| value.get(*k)).filter(|v| !v.is_null())
}

fn text_field(value: &Value, keys: &[&str]) -> String {
    field(value, keys).map(value_to_text).unwrap_or_default()
}

/// `complexity` may arrive as a string or as `{ "time": ..., "space": ... }`.
fn complexity_field(value: &Value) -> String {
    match field(value, &["complexity"]) {
        Some(Value::Object(map)) if map.contains_key("time") || map.contains_key("space") => {
            let time = map.get("time").map(value_to_text).unwrap_or_default();
            let space = map.get("space").map(value_to_text).unwrap_or_default();
            format!("Time: {}, Space: {}", or_unknown(&time), or_unknown(&space))
        }
        Some(v) => value_to_text(v),
        None => String::new(),
    }
}

fn or_unknown(s: &str) -> &str {
    if s.trim().is_empty() {
        "unknown"
    } else {
        s
    }
}

pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(_) => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(value_to_text).collect(),
        Some(Value::String(s)) => s
            .lines()
            .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim().to_string())
            .collect(),
        Some(other) => vec![value_to_text(other)],
    }
}

fn example_list(value: Option<&Value>) -> Vec<Example> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(example_from_value).collect(),
        Some(other) => vec![example_from_value(other)],
    }
}

fn example_from_value(value: &Value) -> Example {
    match value {
        Value::Object(_) => Example {
            input: text_field(value, &["input", "in"]),
            output: text_field(value, &["output", "out", "expected"]),
            note: text_field(value, &["note", "explanation", "notes"]),
        },
        other => Example {
            input: value_to_text(other),
            ..Example::default()
        },
    }
}
