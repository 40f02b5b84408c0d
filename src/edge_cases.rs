//! Edge cases and worked examples.
//!
//! Edge cases start from three seeds that hold for any algorithm, then pick up
//! family cases from the hint set and structural cases from idioms found in
//! the snippet. The list has set semantics: a case is added once, in first-seen
//! order. At most one example is produced, chosen by hint priority.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::Example;
use crate::signals::{has_self_recursive_return, Hint, HintSet};

pub const SEED_CASES: [&str; 3] = ["empty input", "single element", "duplicates"];

pub const ZERO_LENGTH: &str = "zero-length input (n == 0)";
pub const NEGATIVE_NUMBERS: &str = "negative numbers";
pub const NULL_HANDLING: &str = "null / missing values";
pub const DEEP_RECURSION: &str = "deep recursion (stack depth limits)";
pub const MISSING_KEY: &str = "missing key in map lookups";
pub const OVERFLOW: &str = "integer overflow on large values";
pub const MUST_BE_SORTED: &str = "array must be sorted";
pub const OFF_BY_ONE: &str = "off-by-one in boundary updates (lo/hi/mid)";

const SORTING_CASES: [&str; 4] = [
    "already sorted input",
    "reverse-sorted input",
    "all elements equal",
    NEGATIVE_NUMBERS,
];
const BINARY_SEARCH_CASES: [&str; 2] = ["target not present", "target at first or last index"];
const TRAVERSAL_CASES: [&str; 2] = ["disconnected graph", "cycles (track visited nodes)"];
const DP_CASES: [&str; 1] = ["base cases (n = 0, n = 1)"];
const UNION_FIND_CASES: [&str; 1] = ["union of elements already in the same set"];
const HEAP_CASES: [&str; 1] = ["k larger than the input size"];

struct IdiomSet {
    zero_check: Regex,
    negative_index: Regex,
    null_token: Regex,
    map_type: Regex,
    overflow: Regex,
    left: Regex,
    right: Regex,
    mid: Regex,
    inclusive_while: Regex,
}

static IDIOMS: OnceLock<IdiomSet> = OnceLock::new();

impl IdiomSet {
    fn new() -> Self {
        Self {
            zero_check: Regex::new(
                r"(?i)==\s*0\b|\b0\s*==|\b(?:length|size|len|count)\b\s*(?:\(\s*\w*\s*\))?\s*==\s*0|\.is_empty\(\)|\.empty\(\)",
            )
            .expect("zero_check regex must compile"),
            // `< 0` on the same line as an index expression
            negative_index: Regex::new(r"(?m)^.*\w\[[^\]\n]*\].*<\s*0\b.*$|^.*<\s*0\b.*\w\[[^\]\n]*\].*$")
                .expect("negative_index regex must compile"),
            null_token: Regex::new(r"\b(?:null|NULL|nullptr|None|nil|undefined|Nothing)\b")
                .expect("null_token regex must compile"),
            map_type: Regex::new(
                r"(?i)\b(?:unordered_map|map|multimap|hashmap|hash_map|btreemap|treemap|dict|defaultdict|counter|dictionary)\b",
            )
            .expect("map_type regex must compile"),
            overflow: Regex::new(
                r"(?i)overflow|\b(?:int|long|llong|ll|i32|i64|u32|u64)(?:_|::)(?:max|min)\b|integer\.(?:max|min)_value|long\.(?:max|min)_value|\b1e9\b|\b1e18\b|\b2147483647\b|\b9223372036854775807\b",
            )
            .expect("overflow regex must compile"),
            left: Regex::new(r"\b(?:left|lo|low)\b").expect("left regex must compile"),
            right: Regex::new(r"\b(?:right|hi|high)\b").expect("right regex must compile"),
            mid: Regex::new(r"\bmid\b").expect("mid regex must compile"),
            inclusive_while: Regex::new(r"\bwhile\s*\(?\s*\w+\s*<=\s*\w+")
                .expect("inclusive_while regex must compile"),
        }
    }
}

fn idioms() -> &'static IdiomSet {
    IDIOMS.get_or_init(IdiomSet::new)
}

/// Ordered, duplicate-free edge-case list for the snippet.
pub fn collect_edge_cases(snippet: &str, hints: &HintSet) -> Vec<String> {
    let mut cases = EdgeCaseList::default();
    cases.extend(SEED_CASES);

    if hints.contains(Hint::BinarySearch) {
        cases.extend(BINARY_SEARCH_CASES);
    }
    if hints.contains(Hint::Sorting) {
        cases.extend(SORTING_CASES);
    }
    if hints.contains(Hint::Dfs) || hints.contains(Hint::Bfs) {
        cases.extend(TRAVERSAL_CASES);
    }
    if hints.contains(Hint::DynamicProgramming) {
        cases.extend(DP_CASES);
    }
    if hints.contains(Hint::UnionFind) {
        cases.extend(UNION_FIND_CASES);
    }
    if hints.contains(Hint::Heap) {
        cases.extend(HEAP_CASES);
    }

    let i = idioms();
    if i.zero_check.is_match(snippet) {
        cases.push(ZERO_LENGTH);
    }
    if i.negative_index.is_match(snippet) {
        cases.push(NEGATIVE_NUMBERS);
    }
    if i.null_token.is_match(snippet) {
        cases.push(NULL_HANDLING);
    }
    if has_self_recursive_return(snippet) {
        cases.push(DEEP_RECURSION);
    }
    if i.map_type.is_match(snippet) {
        cases.push(MISSING_KEY);
    }
    if i.overflow.is_match(snippet) {
        cases.push(OVERFLOW);
    }
    if i.left.is_match(snippet)
        && i.right.is_match(snippet)
        && i.mid.is_match(snippet)
        && i.inclusive_while.is_match(snippet)
    {
        cases.push(MUST_BE_SORTED);
        cases.push(OFF_BY_ONE);
    }

    cases.into_vec()
}

#[derive(Default)]
struct EdgeCaseList {
    items: Vec<String>,
}

impl EdgeCaseList {
    fn push(&mut self, case: &str) {
        if !self.items.iter().any(|c| c == case) {
            self.items.push(case.to_string());
        }
    }

    fn extend<'a>(&mut self, cases: impl IntoIterator<Item = &'a str>) {
        for case in cases {
            self.push(case);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}

type ExampleRule = (Hint, fn() -> Example);

/// Example priority: binary search, sorting, DFS, dynamic programming.
const EXAMPLE_RULES: [ExampleRule; 4] = [
    (Hint::BinarySearch, binary_search_example),
    (Hint::Sorting, sorting_example),
    (Hint::Dfs, dfs_example),
    (Hint::DynamicProgramming, dp_example),
];

/// Zero or one illustrative example for the dominant recognized hint.
pub fn select_examples(hints: &HintSet) -> Vec<Example> {
    EXAMPLE_RULES
        .iter()
        .find(|(hint, _)| hints.contains(*hint))
        .map(|(_, build)| vec![build()])
        .unwrap_or_default()
}

fn binary_search_example() -> Example {
    Example::new(
        "nums = [-1, 0, 3, 5, 9, 12], target = 9",
        "4",
        "Window [0,5] checks mid = 2 (3 < 9) and moves to [3,5]; mid = 4 holds 9.",
    )
}

fn sorting_example() -> Example {
    Example::new(
        "[64, 25, 12, 22, 11]",
        "[11, 12, 22, 25, 64]",
        "Each pass places the next smallest element at the front of the unsorted part.",
    )
}

fn dfs_example() -> Example {
    Example::new(
        "edges = [(0,1), (0,2), (1,3), (2,4)], start = 0",
        "visit order: 0 1 3 2 4",
        "DFS goes as deep as possible along 0 -> 1 -> 3 before backtracking to explore 2 -> 4.",
    )
}

fn dp_example() -> Example {
    Example::new(
        "n = 5 (climbing stairs with steps of 1 or 2)",
        "8",
        "dp[i] = dp[i-1] + dp[i-2] with dp[0] = 1, dp[1] = 1 gives 1, 1, 2, 3, 5, 8.",
    )
}
