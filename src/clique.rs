//! Maximal clique enumeration (Bron-Kerbosch with pivoting).
//!
//! The recursion is unrolled onto an explicit stack so cliques can be
//! returned one at a time; stack frames are kept in a pool and reused.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

#[derive(Debug, Clone, Default)]
struct Frame {
    /// Clique size on entry.
    depth: usize,
    p: Vec<usize>,
    x: Vec<usize>,
    /// `p` minus the neighbours of the pivot, in the order they are tried.
    branch: Vec<usize>,
    next: usize,
}

/// Iterator-style maximal clique finder over an undirected graph.
#[derive(Debug, Clone, Default)]
pub struct BronKerbosch {
    n: usize,
    adj: Vec<bool>,
    clique: Vec<usize>,
    stack: Vec<Frame>,
    pool: Vec<Frame>,
}

impl BronKerbosch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a finder for `graph` and reset the enumeration.
    pub fn with_graph<N, E>(graph: &UnGraph<N, E>) -> Self {
        let mut bk = Self::new();
        bk.init(graph);
        bk
    }

    /// Load the adjacency of `graph` and restart the enumeration. Self
    /// loops are ignored.
    pub fn init<N, E>(&mut self, graph: &UnGraph<N, E>) {
        self.n = graph.node_count();
        self.adj.clear();
        self.adj.resize(self.n * self.n, false);
        for edge in graph.edge_references() {
            let (a, b) = (edge.source().index(), edge.target().index());
            if a != b {
                self.adj[a * self.n + b] = true;
                self.adj[b * self.n + a] = true;
            }
        }
        while let Some(frame) = self.stack.pop() {
            self.pool.push(frame);
        }
        self.clique.clear();
        if self.n > 0 {
            let mut root = self.frame();
            root.p.extend(0..self.n);
            self.branch_on_pivot(&mut root);
            self.stack.push(root);
        }
    }

    fn adjacent(&self, a: usize, b: usize) -> bool {
        self.adj[a * self.n + b]
    }

    fn frame(&mut self) -> Frame {
        let mut f = self.pool.pop().unwrap_or_default();
        f.depth = 0;
        f.p.clear();
        f.x.clear();
        f.branch.clear();
        f.next = 0;
        f
    }

    /// Pivot: the vertex of `p ∪ x` with the most neighbours in `p`.
    fn branch_on_pivot(&self, frame: &mut Frame) {
        let pivot = frame
            .p
            .iter()
            .chain(&frame.x)
            .copied()
            .max_by_key(|&u| (frame.p.iter().filter(|&&v| self.adjacent(u, v)).count(), std::cmp::Reverse(u)));
        frame.branch.clear();
        match pivot {
            Some(u) => frame
                .branch
                .extend(frame.p.iter().copied().filter(|&v| !self.adjacent(u, v))),
            None => frame.branch.extend_from_slice(&frame.p),
        }
    }

    /// Write the next maximal clique (ascending node indices) to `clique`.
    /// Returns `false` once all cliques have been reported.
    pub fn next_clique(&mut self, clique: &mut Vec<NodeIndex>) -> bool {
        while let Some(mut top) = self.stack.pop() {
            if top.next == top.branch.len() {
                self.pool.push(top);
                continue;
            }
            let v = top.branch[top.next];
            top.next += 1;

            let mut child = self.frame();
            child.depth = top.depth + 1;
            child.p.extend(top.p.iter().copied().filter(|&u| self.adjacent(v, u)));
            child.x.extend(top.x.iter().copied().filter(|&u| self.adjacent(v, u)));
            top.p.retain(|&u| u != v);
            top.x.push(v);

            self.clique.truncate(top.depth);
            self.clique.push(v);
            self.stack.push(top);

            if child.p.is_empty() {
                let maximal = child.x.is_empty();
                self.pool.push(child);
                if maximal {
                    clique.clear();
                    clique.extend(self.clique.iter().map(|&i| NodeIndex::new(i)));
                    clique.sort();
                    return true;
                }
                continue;
            }
            self.branch_on_pivot(&mut child);
            self.stack.push(child);
        }
        false
    }
}
