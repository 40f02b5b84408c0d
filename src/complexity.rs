//! Complexity estimate from the hint set.
//!
//! Nested loops are checked right after binary search: when two loops are
//! structurally nested the estimate never claims anything below quadratic,
//! unless the stronger binary-search signal already applied.

use crate::signals::{Hint, HintSet};

pub const BINARY_SEARCH: &str = "Time: O(log n), Space: O(1)";
pub const QUADRATIC: &str = "Time: O(n^2), Space: O(1) or unknown";
pub const DYNAMIC_PROGRAMMING: &str =
    "Time: O(number of states x transitions per state), Space: O(number of states)";
pub const HEAP: &str = "Time: O(n log n) typical, Space: O(n)";
pub const RECURSIVE: &str =
    "Time: depends on recursion branching, Space: O(recursion depth) call stack";
pub const UNKNOWN: &str = "Time: unknown (heuristic), Space: unknown (heuristic)";

struct Estimate {
    applies: fn(&HintSet, bool) -> bool,
    text: &'static str,
}

const ESTIMATES: &[Estimate] = &[
    Estimate {
        applies: |h, _| h.joined().contains("binary search"),
        text: BINARY_SEARCH,
    },
    Estimate {
        applies: |_, nested| nested,
        text: QUADRATIC,
    },
    Estimate {
        applies: |h, _| h.contains(Hint::DynamicProgramming),
        text: DYNAMIC_PROGRAMMING,
    },
    Estimate {
        applies: |h, _| h.contains(Hint::Heap),
        text: HEAP,
    },
    Estimate {
        applies: |h, _| h.contains(Hint::Recursive),
        text: RECURSIVE,
    },
];

/// `"Time: ..., Space: ..."` for the first applicable estimate.
pub fn estimate(hints: &HintSet, nested_loops: bool) -> String {
    ESTIMATES
        .iter()
        .find(|e| (e.applies)(hints, nested_loops))
        .map_or(UNKNOWN, |e| e.text)
        .to_string()
}
