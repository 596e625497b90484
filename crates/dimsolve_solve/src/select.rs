//! Minimum-DOF subset finder (§4.5): given a bipartite map from equations to
//! the variables they mention, find the smallest subset of equations whose
//! variables can be solved as a closed system.
//!
//! Grounded directly on the original `select_solvable.cc`'s `FindSolution`:
//! identifiers on both sides must be compact (`0..n`), callers translate
//! application-level identifiers (expression node identity, variable names)
//! through small tables before calling in and back out after.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::BTreeSet;

/// One candidate partial solution in the best-first search: the set of
/// equations chosen so far (`from`), the variables they reach (`to`), and
/// the same variables collapsed through two-variable-equation equivalence
/// classes (`reduced`) — the quantity the search actually minimizes first.
#[derive(Debug, Clone, Eq, PartialEq)]
struct Candidate {
    reduced: BTreeSet<usize>,
    from: BTreeSet<usize>,
    to: BTreeSet<usize>,
}

impl Ord for Candidate {
    /// Ordered so a [`BinaryHeap`] (a max-heap) pops the *best* candidate
    /// first: fewer reduced free variables beats fewer variables beats fewer
    /// equations, matching `select_solvable.cc`'s `Sol::operator<` exactly
    /// (which defines "lower priority", the opposite sense of this `Ord`).
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .reduced
            .len()
            .cmp(&self.reduced.len())
            .then_with(|| other.to.len().cmp(&self.to.len()))
            .then_with(|| other.from.len().cmp(&self.from.len()))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Runs the minimum-DOF subset search over `from_to[equation] = {variables}`.
///
/// `from_to` must be compact: equation indices `0..from_to.len()` and
/// variable indices `0..n` for some `n`, every equation set non-empty.
/// Returns `(equations, variables)` with `equations.len() == variables.len()`
/// on success, or `None` if no closed subset exists.
pub fn find_solution(from_to: &[BTreeSet<usize>]) -> Option<(BTreeSet<usize>, BTreeSet<usize>)> {
    for eq in from_to {
        assert!(!eq.is_empty(), "every equation must mention at least one variable");
    }

    // Step zero: a single-variable equation is its own closed system.
    for (i, vars) in from_to.iter().enumerate() {
        if vars.len() == 1 {
            log::warn!("equation {} mentions only one variable", i);
            let var = *vars.iter().next().unwrap();
            return Some((BTreeSet::from([i]), BTreeSet::from([var])));
        }
    }

    // Conflate variables connected by a two-variable equation, iteratively:
    // reducing one equation to two variables can expose a new such equation.
    let mut mapping: Vec<usize> = (0..variable_count(from_to)).collect();
    let mut working: Vec<BTreeSet<usize>> = from_to.to_vec();
    loop {
        let mut new_two = false;
        for vars in &working {
            if vars.len() != 2 {
                continue;
            }
            let mut it = vars.iter();
            let a = *it.next().unwrap();
            let b = *it.next().unwrap();
            let lo = mapping[a].min(mapping[b]);
            mapping[a] = lo;
            mapping[b] = lo;
        }
        for i in 0..mapping.len() {
            mapping[i] = mapping[mapping[i]];
        }
        for (eq, vars) in from_to.iter().zip(working.iter_mut()) {
            let remapped: BTreeSet<usize> = eq.iter().map(|&v| mapping[v]).collect();
            new_two = new_two || remapped.len() == 2;
            *vars = remapped;
        }
        if !new_two {
            break;
        }
    }

    // Best-first search: seed one candidate per equation, expand by adding
    // an equation whose index exceeds the candidate's current maximum (so
    // each subset of equations is only ever built in one order).
    let mut heap = BinaryHeap::new();
    for (i, vars) in from_to.iter().enumerate() {
        heap.push(Candidate {
            reduced: working[i].clone(),
            from: BTreeSet::from([i]),
            to: vars.clone(),
        });
    }

    while let Some(candidate) = heap.pop() {
        if candidate.from.len() == candidate.to.len() {
            log::info!("free variables: {}", candidate.reduced.len());
            return Some((candidate.from, candidate.to));
        }
        let max = *candidate.from.iter().next_back().unwrap();
        for i in (max + 1)..from_to.len() {
            let mut next = candidate.clone();
            next.from.insert(i);
            next.reduced.extend(working[i].iter().copied());
            next.to.extend(from_to[i].iter().copied());
            heap.push(next);
        }
    }

    None
}

fn variable_count(from_to: &[BTreeSet<usize>]) -> usize {
    from_to.iter().flat_map(|s| s.iter()).copied().max().map_or(0, |m| m + 1)
}
