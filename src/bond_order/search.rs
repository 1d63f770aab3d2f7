//! Branch-and-bound assignment of the bonds left undefined after the
//! pattern phase.
//!
//! Each connected fragment of undefined bonds is searched on its own. A
//! bond takes one of the orders 1 to 3, expressed as an extra order 0 to 2
//! over single. Every atom of the fragment has a set of allowed extra sums
//! derived from its allowed valences, and a branch is cut as soon as an
//! atom overshoots its largest sum, can no longer reach its smallest, or
//! finishes on a sum outside the set. Branches are also cut when the best
//! score still reachable does not beat the best complete assignment.

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::{debug, trace, warn};

use super::patterns::bond_order_score;
use super::{ScoringWeights, Workspace};
use crate::bond::UNDEFINED_ORDER;
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasHydrogenCount};
use crate::valence::{allowed_valences, bond_order_sum};

const MAX_EXTRA: u8 = 2;
const EPS: f64 = 1e-9;

/// Bonds reachable from `start` through bonds accepted by `in_fragment`,
/// in breadth-first order. Visited bonds are flagged in `visited`.
pub(crate) fn undefined_bond_fragment<A, B>(
    mol: &Mol<A, B>,
    start: EdgeIndex,
    in_fragment: impl Fn(EdgeIndex) -> bool,
    visited: &mut [bool],
) -> Vec<EdgeIndex> {
    let mut fragment = Vec::new();
    let mut queue = VecDeque::from([start]);
    visited[start.index()] = true;
    while let Some(bond) = queue.pop_front() {
        fragment.push(bond);
        let (a, b) = mol.endpoints(bond);
        for atom in [a, b] {
            for next in mol.bonds_of(atom) {
                if !visited[next.index()] && in_fragment(next) {
                    visited[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    fragment
}

/// Extra bond order sums an atom may take over its undefined bonds, in
/// ascending order. Atoms without a valence model take none.
fn allowed_extra_sums<A, B>(mol: &Mol<A, B>, ws: &Workspace, atom: NodeIndex) -> Vec<u8>
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let a = mol.atom(atom);
    let allowed = allowed_valences(a.atomic_num(), ws.charges[atom.index()]);
    if allowed.is_empty() {
        return vec![0];
    }
    let (fixed, undefined) = bond_order_sum(mol, atom, &ws.orders);
    let base = fixed as i16 + a.hydrogen_count() as i16 + undefined as i16;
    let cap = undefined as i16 * MAX_EXTRA as i16;
    allowed
        .iter()
        .map(|&v| v as i16 - base)
        .filter(|&extra| (0..=cap).contains(&extra))
        .map(|extra| extra as u8)
        .collect()
}

struct FragmentSearch<'a> {
    weights: &'a ScoringWeights,
    /// Local atom slots of each bond's endpoints.
    ends: Vec<(usize, usize)>,
    /// Score of each extra order per bond.
    options: Vec<[f64; 3]>,
    /// Extra orders per bond, best local score first.
    order: Vec<Vec<u8>>,
    /// Sum of the best option scores of bonds `i..`.
    suffix_best: Vec<f64>,
    allowed: Vec<Vec<u8>>,
    remaining: Vec<u8>,
    sums: Vec<u8>,
    choice: Vec<u8>,
    best: Option<Vec<u8>>,
    best_score: f64,
    steps: usize,
    max_steps: usize,
}

impl FragmentSearch<'_> {
    fn min_allowed(&self, slot: usize) -> u8 {
        self.allowed[slot].first().copied().unwrap_or(0)
    }

    fn max_allowed(&self, slot: usize) -> u8 {
        self.allowed[slot].last().copied().unwrap_or(0)
    }

    /// Penalty for finishing `slot` above its lowest allowed sum, or `None`
    /// if its sum is not allowed.
    fn finish(&self, slot: usize) -> Option<f64> {
        let sum = self.sums[slot];
        if !self.allowed[slot].contains(&sum) {
            return None;
        }
        Some(self.weights.expanded_valence * (sum - self.min_allowed(slot)) as f64)
    }

    fn feasible(&self, slot: usize) -> bool {
        let sum = self.sums[slot];
        sum <= self.max_allowed(slot) && sum + self.remaining[slot] * MAX_EXTRA >= self.min_allowed(slot)
    }

    fn run(&mut self, pos: usize, score: f64) {
        self.steps += 1;
        if self.steps > self.max_steps {
            return;
        }
        if pos == self.ends.len() {
            if self.best.is_none() || score > self.best_score + EPS {
                self.best_score = score;
                self.best = Some(self.choice.clone());
            }
            return;
        }
        if self.best.is_some() && score + self.suffix_best[pos] <= self.best_score + EPS {
            return;
        }

        let (a, b) = self.ends[pos];
        let order = std::mem::take(&mut self.order[pos]);
        for &extra in &order {
            self.sums[a] += extra;
            self.sums[b] += extra;
            self.remaining[a] -= 1;
            self.remaining[b] -= 1;

            let mut next = Some(score + self.options[pos][extra as usize]);
            for slot in [a, b] {
                next = match next {
                    Some(_) if !self.feasible(slot) => None,
                    Some(s) if self.remaining[slot] == 0 => self.finish(slot).map(|p| s - p),
                    other => other,
                };
            }
            if let Some(next) = next {
                self.choice[pos] = extra;
                self.run(pos + 1, next);
            }

            self.sums[a] -= extra;
            self.sums[b] -= extra;
            self.remaining[a] += 1;
            self.remaining[b] += 1;
        }
        self.order[pos] = order;
    }
}

pub(crate) enum FragmentOutcome {
    Solved,
    /// The step limit was hit; the best assignment found so far is used.
    Truncated,
    Unsolved,
}

fn search_fragment<A, B>(
    mol: &Mol<A, B>,
    ws: &mut Workspace,
    fragment: &[EdgeIndex],
    marked: &[bool],
    weights: &ScoringWeights,
    max_steps: usize,
) -> FragmentOutcome
where
    A: HasAtomicNum + HasHydrogenCount,
{
    let mut slot_of = vec![usize::MAX; mol.atom_count()];
    let mut atoms = Vec::new();
    let mut ends = Vec::with_capacity(fragment.len());
    for &bond in fragment {
        let (a, b) = mol.endpoints(bond);
        let mut slot = |atom: NodeIndex| {
            if slot_of[atom.index()] == usize::MAX {
                slot_of[atom.index()] = atoms.len();
                atoms.push(atom);
            }
            slot_of[atom.index()]
        };
        ends.push((slot(a), slot(b)));
    }

    let allowed: Vec<Vec<u8>> = atoms.iter().map(|&a| allowed_extra_sums(mol, ws, a)).collect();
    if allowed.iter().any(Vec::is_empty) {
        return FragmentOutcome::Unsolved;
    }
    let mut remaining = vec![0u8; atoms.len()];
    for &(a, b) in &ends {
        remaining[a] += 1;
        remaining[b] += 1;
    }

    let options: Vec<[f64; 3]> = fragment
        .iter()
        .map(|&bond| {
            let mut scores = [0.0; 3];
            for (extra, s) in scores.iter_mut().enumerate() {
                *s = bond_order_score(mol, ws, bond, extra as u8 + 1, weights);
                if extra > 0 && marked[bond.index()] {
                    *s += weights.conjugation_bonus;
                }
            }
            scores
        })
        .collect();
    let order: Vec<Vec<u8>> = options
        .iter()
        .zip(&ends)
        .map(|(scores, &(a, b))| {
            let reach = allowed[a].last().copied().unwrap_or(0).min(allowed[b].last().copied().unwrap_or(0));
            let mut extras: Vec<u8> = (0..=MAX_EXTRA.min(reach)).collect();
            extras.sort_by(|&x, &y| scores[y as usize].total_cmp(&scores[x as usize]));
            extras
        })
        .collect();
    let mut suffix_best = vec![0.0; fragment.len() + 1];
    for i in (0..fragment.len()).rev() {
        let best = order[i].iter().map(|&e| options[i][e as usize]).fold(f64::NEG_INFINITY, f64::max);
        suffix_best[i] = suffix_best[i + 1] + best.max(0.0);
    }

    let mut search = FragmentSearch {
        weights,
        ends,
        options,
        order,
        suffix_best,
        allowed,
        remaining,
        sums: vec![0; atoms.len()],
        choice: vec![0; fragment.len()],
        best: None,
        best_score: f64::NEG_INFINITY,
        steps: 0,
        max_steps,
    };
    search.run(0, 0.0);
    trace!(bonds = fragment.len(), steps = search.steps, score = search.best_score, "fragment searched");

    let truncated = search.steps > max_steps;
    match search.best {
        Some(best) => {
            for (&bond, extra) in fragment.iter().zip(best) {
                ws.orders[bond.index()] = extra + 1;
            }
            if truncated {
                FragmentOutcome::Truncated
            } else {
                FragmentOutcome::Solved
            }
        }
        None => FragmentOutcome::Unsolved,
    }
}

/// Resolve every fragment of undefined bonds; fragments without a valid
/// assignment stay undefined.
pub(crate) fn assign_fragment_bond_orders<A, B>(
    mol: &Mol<A, B>,
    ws: &mut Workspace,
    marked: &[bool],
    weights: &ScoringWeights,
    max_steps: usize,
) where
    A: HasAtomicNum + HasHydrogenCount,
{
    let mut visited = vec![false; mol.bond_count()];
    let (mut solved, mut unsolved) = (0usize, 0usize);
    for bond in mol.bonds() {
        if visited[bond.index()] || ws.orders[bond.index()] != UNDEFINED_ORDER {
            continue;
        }
        let orders = &ws.orders;
        let fragment = undefined_bond_fragment(mol, bond, |e| orders[e.index()] == UNDEFINED_ORDER, &mut visited);
        match search_fragment(mol, ws, &fragment, marked, weights, max_steps) {
            FragmentOutcome::Solved => solved += 1,
            FragmentOutcome::Truncated => {
                warn!(bonds = fragment.len(), max_steps, "bond order search truncated");
                solved += 1;
            }
            FragmentOutcome::Unsolved => unsolved += 1,
        }
    }
    debug!(solved, unsolved, "fragment search finished");
}
