//! Canned plain-language explanations.
//!
//! The text is static per family and never synthesized from the input. When no
//! family matches with confidence the explanation is empty.

use crate::signals::{Hint, HintSet};

pub const BINARY_SEARCH: &str = "\
Binary search keeps a window [lo, hi] that must contain the answer if it exists. \
Each step looks at the middle element and throws away the half that cannot hold \
the target, so the window shrinks by half every iteration.

This only works because the data is sorted (or the predicate being searched is \
monotonic). The classic pitfalls are the loop condition (lo <= hi versus lo < hi) \
and how mid moves the boundaries; getting either wrong causes an infinite loop or \
skips the answer. Computing mid as lo + (hi - lo) / 2 avoids overflow.";

pub const SELECTION_SORT: &str = "\
Selection sort splits the array into a sorted prefix and an unsorted suffix. On \
every pass it scans the suffix for the smallest element and swaps it into the \
first unsorted slot, growing the sorted prefix by one.

The two nested loops make it O(n^2) comparisons regardless of input order, but it \
performs at most n - 1 swaps, which is why it appears where writes are expensive. \
It sorts in place and is not stable.";

pub const DFS: &str = "\
Depth-first search explores a graph by following one path as far as it goes \
before backtracking to the most recent node with unexplored neighbors. It is \
written either recursively or with an explicit stack.

A visited set prevents revisiting nodes and looping forever on cycles. Running \
DFS from every unvisited node covers disconnected components, which is how it \
counts components, detects cycles and produces topological orders.";

pub const DYNAMIC_PROGRAMMING: &str = "\
Dynamic programming solves a problem by defining a state that captures a \
subproblem, writing how each state's answer follows from smaller states, and \
computing every state once.

The answer is filled in bottom-up in a table or top-down with memoization. Base \
cases anchor the recurrence, and the total cost is the number of states times \
the work per transition.";

struct Explanation {
    applies: fn(&str, &HintSet) -> bool,
    text: &'static str,
}

const EXPLANATIONS: &[Explanation] = &[
    Explanation {
        applies: |title, hints| title.contains("binary search") || hints.contains(Hint::BinarySearch),
        text: BINARY_SEARCH,
    },
    Explanation {
        applies: |title, _| title.contains("selection sort"),
        text: SELECTION_SORT,
    },
    Explanation {
        applies: |title, hints| title.contains("depth-first") || hints.contains(Hint::Dfs),
        text: DFS,
    },
    Explanation {
        applies: |title, hints| {
            title.contains("dynamic programming") || hints.contains(Hint::DynamicProgramming)
        },
        text: DYNAMIC_PROGRAMMING,
    },
];

/// Explanation for the resolved title and hints, or an empty string.
pub fn compose(title: &str, hints: &HintSet) -> String {
    let title = title.to_lowercase();
    EXPLANATIONS
        .iter()
        .find(|e| (e.applies)(&title, hints))
        .map(|e| e.text.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_sort_keyed_on_title() {
        let hints: HintSet = [Hint::Sorting, Hint::InPlaceSwap, Hint::NestedLoops]
            .into_iter()
            .collect();
        assert_eq!(compose("Selection Sort (likely)", &hints), SELECTION_SORT);
    }

    #[test]
    fn comment_title_can_select_family() {
        assert_eq!(compose("Binary search on the answer", &HintSet::new()), BINARY_SEARCH);
    }

    #[test]
    fn bare_sorting_has_no_explanation() {
        let hints: HintSet = [Hint::Sorting].into_iter().collect();
        assert_eq!(compose("Sorting Problem (likely)", &hints), "");
    }

    #[test]
    fn graph_traversal_title_with_dfs_hint() {
        let hints: HintSet = [Hint::Dfs].into_iter().collect();
        assert_eq!(compose("Graph Traversal (DFS/BFS)", &hints), DFS);
    }

    #[test]
    fn nothing_matches_gives_empty() {
        assert_eq!(compose("Problem not confidently inferred", &HintSet::new()), "");
    }
}
