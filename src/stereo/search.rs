//! Local search for a small marker set that encodes every stereocenter.
//!
//! Centers are visited in a fixed order: centers that must stay
//! unspecified first, then by how many of their candidate bonds are
//! already marked (descending) and by index. An unsatisfied center tries
//! moves of one or two marker changes on its candidate bonds, cheapest
//! first (fewest new markers), and accepts the first move that satisfies
//! it without breaking a center visited before. A pruning pass then drops
//! every generated marker the result does not need. If centers remain
//! unsatisfied the search is repeated in reverse order and the better
//! result, by mismatches and then by marker count, is kept.
//!
//! Centers sharing a candidate bond form one component. Each component is
//! searched on its own with its own step budget, and the better of its two
//! passes is kept independently of the other components.

use std::cmp::Reverse;

use petgraph::graph::EdgeIndex;
use petgraph::unionfind::UnionFind;
use tracing::trace;

pub(crate) trait MarkerProblem {
    type Marker: Copy + PartialEq + Default;

    fn num_centers(&self) -> usize;

    /// Bonds that may carry a marker for `center`, in preference order.
    fn candidates(&self, center: usize) -> &[EdgeIndex];

    fn choices(&self, center: usize, bond: EdgeIndex) -> [Self::Marker; 2];

    /// Centers that must stay unspecified; visited first.
    fn is_unspecified(&self, center: usize) -> bool;

    fn is_satisfied(&self, center: usize, markers: &[Self::Marker]) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SearchOutcome {
    pub(crate) num_mismatches: usize,
    pub(crate) num_marked: usize,
}

struct Search<'a, P: MarkerProblem> {
    problem: &'a P,
    fixed: &'a [bool],
    steps: usize,
    max_steps: usize,
}

impl<P: MarkerProblem> Search<'_, P> {
    fn exhausted(&mut self) -> bool {
        self.steps += 1;
        self.steps > self.max_steps
    }

    fn mismatches(&self, centers: &[usize], markers: &[P::Marker]) -> usize {
        centers
            .iter()
            .filter(|&&c| !self.problem.is_satisfied(c, markers))
            .count()
    }

    /// Single marker changes available to `center`: additions first.
    fn changes(&self, center: usize, markers: &[P::Marker]) -> Vec<(EdgeIndex, P::Marker, bool)> {
        let mut additions = Vec::new();
        let mut switches = Vec::new();
        for &bond in self.problem.candidates(center) {
            let current = markers[bond.index()];
            let unmarked = current == P::Marker::default();
            if !unmarked && self.fixed[bond.index()] {
                continue;
            }
            let mut choices = self.problem.choices(center, bond).to_vec();
            choices.dedup();
            for m in choices.into_iter().filter(|&m| m != current) {
                if unmarked {
                    additions.push((bond, m, true));
                } else {
                    switches.push((bond, m, false));
                }
            }
        }
        additions.extend(switches);
        additions
    }

    fn satisfy(&mut self, center: usize, visited: &[usize], markers: &mut [P::Marker]) -> bool {
        let broken_before = self.mismatches(visited, markers);
        let changes = self.changes(center, markers);

        let mut moves: Vec<Vec<usize>> = (0..changes.len()).map(|i| vec![i]).collect();
        for i in 0..changes.len() {
            for j in i + 1..changes.len() {
                if changes[i].0 != changes[j].0 {
                    moves.push(vec![i, j]);
                }
            }
        }
        let added = |m: &Vec<usize>| m.iter().filter(|&&i| changes[i].2).count();
        moves.sort_by_key(|m| (added(m), m.len()));

        for mv in moves {
            if self.exhausted() {
                return false;
            }
            let saved: Vec<P::Marker> = mv.iter().map(|&i| markers[changes[i].0.index()]).collect();
            for &i in &mv {
                markers[changes[i].0.index()] = changes[i].1;
            }
            if self.problem.is_satisfied(center, markers) && self.mismatches(visited, markers) <= broken_before {
                return true;
            }
            for (&i, old) in mv.iter().zip(saved) {
                markers[changes[i].0.index()] = old;
            }
        }
        false
    }

    fn greedy(&mut self, order: &[usize], markers: &mut [P::Marker]) {
        let mut visited = Vec::with_capacity(order.len());
        for &center in order {
            if !self.problem.is_satisfied(center, markers) {
                self.satisfy(center, &visited, markers);
            }
            visited.push(center);
        }
    }

    fn prune(&mut self, centers: &[usize], bonds: &[EdgeIndex], markers: &mut [P::Marker]) {
        let current = self.mismatches(centers, markers);
        for &bond in bonds {
            let i = bond.index();
            if self.fixed[i] || markers[i] == P::Marker::default() {
                continue;
            }
            if self.exhausted() {
                return;
            }
            let old = markers[i];
            markers[i] = P::Marker::default();
            if self.mismatches(centers, markers) > current {
                markers[i] = old;
            }
        }
    }
}

/// Centers grouped by shared candidate bonds, each group in ascending
/// order, groups ordered by their first center.
fn center_components<P: MarkerProblem>(problem: &P, num_bonds: usize) -> Vec<Vec<usize>> {
    let n = problem.num_centers();
    let mut sets = UnionFind::<usize>::new(n);
    let mut owner: Vec<Option<usize>> = vec![None; num_bonds];
    for center in 0..n {
        for bond in problem.candidates(center) {
            match owner.get(bond.index()).copied().flatten() {
                Some(other) => {
                    sets.union(center, other);
                }
                None => {
                    if let Some(slot) = owner.get_mut(bond.index()) {
                        *slot = Some(center);
                    }
                }
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_of: Vec<Option<usize>> = vec![None; n];
    for center in 0..n {
        let root = sets.find(center);
        let g = *group_of[root].get_or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[g].push(center);
    }
    groups
}

/// Best of the forward and reversed passes over one component; the
/// winner's markers are written back to the component's bonds only.
/// Returns the number of centers left unsatisfied.
fn solve_component<P: MarkerProblem>(
    problem: &P,
    centers: &[usize],
    markers: &mut [P::Marker],
    fixed: &[bool],
    max_steps: usize,
) -> usize {
    let constrained = |c: usize| {
        problem
            .candidates(c)
            .iter()
            .filter(|b| markers[b.index()] != P::Marker::default())
            .count()
    };
    let mut order = centers.to_vec();
    order.sort_by_key(|&c| (!problem.is_unspecified(c), Reverse(constrained(c)), c));
    let reversed: Vec<usize> = {
        let split = order.iter().take_while(|&&c| problem.is_unspecified(c)).count();
        let mut r = order[..split].to_vec();
        r.extend(order[split..].iter().rev());
        r
    };
    let mut bonds: Vec<EdgeIndex> = centers
        .iter()
        .flat_map(|&c| problem.candidates(c).iter().copied())
        .collect();
    bonds.sort();
    bonds.dedup();

    let mut search = Search {
        problem,
        fixed,
        steps: 0,
        max_steps,
    };
    let mut best: Option<((usize, usize), Vec<P::Marker>)> = None;
    for pass in [&order, &reversed] {
        let mut work = markers.to_vec();
        search.greedy(pass, &mut work);
        search.prune(centers, &bonds, &mut work);
        let mismatches = search.mismatches(centers, &work);
        let marked = bonds
            .iter()
            .filter(|b| work[b.index()] != P::Marker::default())
            .count();
        trace!(centers = centers.len(), mismatches, marked, "marker pass");
        if best.as_ref().map_or(true, |(b, _)| (mismatches, marked) < *b) {
            best = Some(((mismatches, marked), work));
        }
        if mismatches == 0 || search.steps > max_steps {
            break;
        }
    }

    match best {
        Some(((mismatches, _), work)) => {
            for bond in &bonds {
                markers[bond.index()] = work[bond.index()];
            }
            mismatches
        }
        None => 0,
    }
}

/// Extend `markers` (one per bond) until every center of `problem` is
/// satisfied or the step budget of its component runs out. Markers flagged
/// in `fixed` are never changed.
pub(crate) fn solve<P: MarkerProblem>(
    problem: &P,
    markers: &mut Vec<P::Marker>,
    fixed: &[bool],
    max_steps: usize,
) -> SearchOutcome {
    let components = center_components(problem, markers.len());
    let num_mismatches = components
        .iter()
        .map(|centers| solve_component(problem, centers, markers, fixed, max_steps))
        .sum();
    SearchOutcome {
        num_mismatches,
        num_marked: markers.iter().filter(|&&m| m != P::Marker::default()).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A center is satisfied when each of its wanted bonds carries the
    /// wanted marker.
    struct Toy {
        candidates: Vec<Vec<EdgeIndex>>,
        wanted: Vec<Vec<(usize, u8)>>,
    }

    impl MarkerProblem for Toy {
        type Marker = u8;

        fn num_centers(&self) -> usize {
            self.candidates.len()
        }

        fn candidates(&self, center: usize) -> &[EdgeIndex] {
            &self.candidates[center]
        }

        fn choices(&self, _center: usize, _bond: EdgeIndex) -> [u8; 2] {
            [1, 2]
        }

        fn is_unspecified(&self, _center: usize) -> bool {
            false
        }

        fn is_satisfied(&self, center: usize, markers: &[u8]) -> bool {
            self.wanted[center].iter().all(|&(b, m)| markers[b] == m)
        }
    }

    /// A center is satisfied when any one of its options holds.
    struct AnyOf {
        candidates: Vec<Vec<EdgeIndex>>,
        options: Vec<Vec<(usize, u8)>>,
    }

    impl MarkerProblem for AnyOf {
        type Marker = u8;

        fn num_centers(&self) -> usize {
            self.candidates.len()
        }

        fn candidates(&self, center: usize) -> &[EdgeIndex] {
            &self.candidates[center]
        }

        fn choices(&self, _center: usize, _bond: EdgeIndex) -> [u8; 2] {
            [1, 2]
        }

        fn is_unspecified(&self, _center: usize) -> bool {
            false
        }

        fn is_satisfied(&self, center: usize, markers: &[u8]) -> bool {
            self.options[center].iter().any(|&(b, m)| markers[b] == m)
        }
    }

    fn e(i: usize) -> EdgeIndex {
        EdgeIndex::new(i)
    }

    #[test]
    fn shared_bond_is_reused() {
        let toy = Toy {
            candidates: vec![vec![e(0), e(1)], vec![e(0), e(2)]],
            wanted: vec![vec![(0, 1)], vec![(0, 1)]],
        };
        let mut markers = vec![0; 3];
        let outcome = solve(&toy, &mut markers, &[false; 3], 1000);
        assert_eq!(outcome, SearchOutcome { num_mismatches: 0, num_marked: 1 });
        assert_eq!(markers, vec![1, 0, 0]);
    }

    #[test]
    fn pairs_are_tried() {
        let toy = Toy {
            candidates: vec![vec![e(0), e(1)]],
            wanted: vec![vec![(0, 2), (1, 1)]],
        };
        let mut markers = vec![0; 2];
        let outcome = solve(&toy, &mut markers, &[false; 2], 1000);
        assert_eq!(outcome.num_mismatches, 0);
        assert_eq!(markers, vec![2, 1]);
    }

    #[test]
    fn conflicts_are_reported() {
        let toy = Toy {
            candidates: vec![vec![e(0)], vec![e(0)]],
            wanted: vec![vec![(0, 1)], vec![(0, 2)]],
        };
        let mut markers = vec![0; 1];
        let outcome = solve(&toy, &mut markers, &[false], 1000);
        assert_eq!(outcome.num_mismatches, 1);
        assert_eq!(outcome.num_marked, 1);
    }

    #[test]
    fn components_keep_their_own_best_pass() {
        // Centers 0 and 1 only succeed when visited in reverse, centers 2
        // and 3 only in forward order.
        let problem = AnyOf {
            candidates: vec![vec![e(0), e(1)], vec![e(0)], vec![e(2)], vec![e(2), e(3)]],
            options: vec![vec![(0, 1), (1, 1)], vec![(0, 2)], vec![(2, 2)], vec![(2, 1), (3, 1)]],
        };
        assert_eq!(center_components(&problem, 4), vec![vec![0, 1], vec![2, 3]]);

        let mut markers = vec![0; 4];
        let outcome = solve(&problem, &mut markers, &[false; 4], 1000);
        assert_eq!(outcome, SearchOutcome { num_mismatches: 0, num_marked: 4 });
        assert_eq!(markers, vec![2, 1, 2, 1]);
    }

    #[test]
    fn independent_components_ignore_each_other() {
        let toy = Toy {
            candidates: vec![vec![e(0)], vec![e(1)], vec![e(2)]],
            wanted: vec![vec![(0, 1)], vec![(1, 1)], vec![(2, 2)]],
        };
        let mut markers = vec![0; 3];
        let outcome = solve(&toy, &mut markers, &[false; 3], 1000);
        assert_eq!(outcome.num_mismatches, 0);
        assert_eq!(markers, vec![1, 1, 2]);
    }

    #[test]
    fn fixed_markers_stay() {
        let toy = Toy {
            candidates: vec![vec![e(0), e(1)]],
            wanted: vec![vec![(1, 2)]],
        };
        let mut markers = vec![1, 0];
        let outcome = solve(&toy, &mut markers, &[true, false], 1000);
        assert_eq!(outcome.num_mismatches, 0);
        assert_eq!(markers, vec![1, 2]);
    }
}
