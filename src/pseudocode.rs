//! Canned pseudocode keyed by algorithm family.

use crate::classify::{classify, Family};
use crate::signals::{Hint, HintSet};

pub const BINARY_SEARCH: &str = "\
lo <- 0
hi <- n - 1
while lo <= hi:
    mid <- lo + (hi - lo) / 2
    if a[mid] == target:
        return mid
    else if a[mid] < target:
        lo <- mid + 1
    else:
        hi <- mid - 1
return -1";

pub const SELECTION_SORT: &str = "\
for i <- 0 to n - 2:
    minIndex <- i
    for j <- i + 1 to n - 1:
        if a[j] < a[minIndex]:
            minIndex <- j
    swap a[i], a[minIndex]
return a";

pub const SORTING: &str = "sort the input with an efficient O(n log n) sort, then read the answer off the sorted order";

pub const DFS: &str = "\
visited <- empty set
function dfs(node):
    mark node as visited
    for each neighbor of node:
        if neighbor not in visited:
            dfs(neighbor)
for each node in graph:
    if node not in visited:
        dfs(node)";

pub const BFS: &str = "\
queue <- [start]
visited <- {start}
while queue is not empty:
    node <- queue.pop_front()
    for each neighbor of node:
        if neighbor not in visited:
            visited.add(neighbor)
            queue.push_back(neighbor)";

pub const DYNAMIC_PROGRAMMING: &str = "\
define state dp[i] (or dp[i][j]) as the answer for a subproblem
initialize base cases
for each state in dependency order:
    dp[state] <- combine(dp[smaller states])
return dp[final state]";

pub const UNION_FIND: &str = "\
parent[x] <- x for every element
function find(x):
    if parent[x] != x:
        parent[x] <- find(parent[x])
    return parent[x]
function union(a, b):
    ra <- find(a); rb <- find(b)
    if ra != rb:
        attach the smaller-rank root under the larger";

pub const HEAP: &str = "\
heap <- empty priority queue
for each item in input:
    push item into heap
    if heap is larger than needed:
        pop the top
while heap is not empty:
    process heap.pop()";

pub const RECURSIVE: &str = "\
function solve(problem):
    if problem is a base case:
        return its direct answer
    split problem into smaller subproblems
    results <- solve(each subproblem)
    return combine(results)";

pub const GENERIC: &str = "\
parse input
apply the inferred idea to compute the answer
output the result";

/// Pseudocode for the dominant family. Never empty.
pub fn synthesize(hints: &HintSet) -> String {
    let text = match classify(hints) {
        Some(Family::BinarySearch) => BINARY_SEARCH,
        Some(Family::SelectionSort) => SELECTION_SORT,
        Some(Family::Sorting) => SORTING,
        Some(Family::GraphTraversal) if hints.contains(Hint::Dfs) => DFS,
        Some(Family::GraphTraversal) => BFS,
        Some(Family::DynamicProgramming) => DYNAMIC_PROGRAMMING,
        Some(Family::UnionFind) => UNION_FIND,
        Some(Family::Heap) => HEAP,
        Some(Family::DivideAndConquer) => RECURSIVE,
        Some(Family::Quadratic) | None => GENERIC,
    };
    text.to_string()
}
