//! Title inference.
//!
//! Maps a [`HintSet`] to an algorithm [`Family`] through an ordered rule table
//! and turns that into a human-readable title. The table is evaluated top to
//! bottom and the first matching rule wins. Specific signatures sit above the
//! generic rules they are supersets of: binary search outranks selection sort,
//! and selection sort outranks bare sorting and bare nested loops.

use crate::signals::{is_author_line, Hint, HintSet};

/// Returned when neither the comment nor any hint yields a title.
pub const TITLE_NOT_INFERRED: &str = "Problem not confidently inferred";

/// Leading-comment first lines are used verbatim within this length range.
const COMMENT_TITLE_MIN: usize = 6;
const COMMENT_TITLE_MAX: usize = 199;

/// Algorithm family recognized from lexical signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    BinarySearch,
    SelectionSort,
    Sorting,
    GraphTraversal,
    DynamicProgramming,
    UnionFind,
    Heap,
    DivideAndConquer,
    Quadratic,
}

impl Family {
    pub fn title(&self) -> &'static str {
        match self {
            Family::BinarySearch => "Binary Search (likely)",
            Family::SelectionSort => "Selection Sort (likely)",
            Family::Sorting => "Sorting Problem (likely)",
            Family::GraphTraversal => "Graph Traversal (DFS/BFS)",
            Family::DynamicProgramming => "Dynamic Programming Problem (likely)",
            Family::UnionFind => "Disjoint Set Union / Union-Find (likely)",
            Family::Heap => "Heap / Priority Queue Problem (likely)",
            Family::DivideAndConquer => "Divide and Conquer / Recursion (likely)",
            Family::Quadratic => "Brute-Force Quadratic Pattern (likely)",
        }
    }
}

/// A single classification rule over the joined, lower-cased hint text.
pub struct Rule {
    pub family: Family,
    pub matches: fn(&str) -> bool,
}

/// The priority-ordered rule table.
pub const RULES: &[Rule] = &[
    Rule {
        family: Family::BinarySearch,
        matches: |h| h.contains("binary search"),
    },
    Rule {
        family: Family::SelectionSort,
        matches: |h| h.contains("sorting") && h.contains("in-place swap") && h.contains("nested loops"),
    },
    Rule {
        family: Family::Sorting,
        matches: |h| h.contains("sorting"),
    },
    Rule {
        family: Family::GraphTraversal,
        matches: |h| h.contains("dfs") || h.contains("bfs") || h.contains("graph traversal"),
    },
    Rule {
        family: Family::DynamicProgramming,
        matches: |h| h.contains("dynamic programming"),
    },
    Rule {
        family: Family::UnionFind,
        matches: |h| h.contains("union-find"),
    },
    Rule {
        family: Family::Heap,
        matches: |h| h.contains("heap"),
    },
    Rule {
        family: Family::DivideAndConquer,
        matches: |h| h.contains("recursive"),
    },
    Rule {
        family: Family::Quadratic,
        matches: |h| h.contains("nested loops"),
    },
];

/// First family in [`RULES`] whose predicate accepts the hint text.
pub fn classify(hints: &HintSet) -> Option<Family> {
    let joined = hints.joined();
    RULES
        .iter()
        .find(|rule| (rule.matches)(&joined))
        .map(|rule| rule.family)
}

/// Resolve the note title from the leading comment and the hint set.
///
/// 1. The comment's first line, if 6–199 characters and not an `author:` label.
/// 2. The title of the first matching family rule.
/// 3. `"<First hint> problem (inferred)"`.
/// 4. [`TITLE_NOT_INFERRED`].
pub fn infer_title(hints: &HintSet, top_comment: &str) -> String {
    if let Some(title) = comment_title(top_comment) {
        return title;
    }
    if let Some(family) = classify(hints) {
        return family.title().to_string();
    }
    if let Some(first) = hints.first() {
        return format!("{} problem (inferred)", capitalize(first.tag()));
    }
    TITLE_NOT_INFERRED.to_string()
}

fn comment_title(top_comment: &str) -> Option<String> {
    let first = top_comment.lines().next()?.trim();
    let len = first.chars().count();
    if (COMMENT_TITLE_MIN..=COMMENT_TITLE_MAX).contains(&len) && !is_author_line(first) {
        Some(first.to_string())
    } else {
        None
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
