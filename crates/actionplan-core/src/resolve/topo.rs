//! Stable topological sort of one phase bucket.
//!
//! Nodes are indices into the bucket; `order` is each node's registration
//! sequence number and is the tie-break among ready nodes.

use std::collections::{BTreeSet, HashMap};

/// An edge hint naming a key that is not a node of this bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingHint {
    pub from: usize,
    pub target: String,
}

/// Directed graph over bucket nodes. `a -> b` means a sorts before b.
#[derive(Debug, Default)]
pub struct Graph {
    orders: Vec<usize>,
    successors: Vec<BTreeSet<usize>>,
    indegree: Vec<usize>,
    dangling: Vec<DanglingHint>,
}

/// Per-node ordering input: registration order, key, and hints.
pub struct NodeSpec<'a> {
    pub order: usize,
    pub key: Option<&'a str>,
    pub before: &'a BTreeSet<String>,
    pub after: &'a BTreeSet<String>,
}

impl Graph {
    /// Build the graph, normalizing both hint forms into `before` edges.
    pub fn build(nodes: &[NodeSpec<'_>]) -> Self {
        let by_key: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.key.map(|k| (k, i)))
            .collect();

        let mut graph = Graph {
            orders: nodes.iter().map(|n| n.order).collect(),
            successors: vec![BTreeSet::new(); nodes.len()],
            indegree: vec![0; nodes.len()],
            dangling: Vec::new(),
        };

        for (i, node) in nodes.iter().enumerate() {
            for target in node.before.iter() {
                match by_key.get(target.as_str()) {
                    Some(&j) => graph.add_edge(i, j),
                    None => graph.dangling.push(DanglingHint {
                        from: i,
                        target: target.clone(),
                    }),
                }
            }
            for target in node.after.iter() {
                match by_key.get(target.as_str()) {
                    Some(&j) => graph.add_edge(j, i),
                    None => graph.dangling.push(DanglingHint {
                        from: i,
                        target: target.clone(),
                    }),
                }
            }
        }
        graph
    }

    fn add_edge(&mut self, from: usize, to: usize) {
        if self.successors[from].insert(to) {
            self.indegree[to] += 1;
        }
    }

    pub fn dangling(&self) -> &[DanglingHint] {
        &self.dangling
    }

    fn len(&self) -> usize {
        self.orders.len()
    }
}

/// Result of sorting one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    /// Node indices in execution order.
    Sorted(Vec<usize>),
    /// Every unresolved node with the unresolved nodes it must still precede,
    /// both in registration order.
    Cycle(Vec<(usize, Vec<usize>)>),
}

/// Repeatedly emit the ready node with the smallest registration order.
pub fn sort(graph: &Graph) -> SortOutcome {
    let mut indegree = graph.indegree.clone();
    let mut ready: BTreeSet<(usize, usize)> = indegree
        .iter()
        .enumerate()
        .filter(|(_, &deg)| deg == 0)
        .map(|(i, _)| (graph.orders[i], i))
        .collect();

    let mut sorted = Vec::with_capacity(graph.len());
    let mut done = vec![false; graph.len()];

    while let Some((_, node)) = ready.pop_first() {
        sorted.push(node);
        done[node] = true;
        for &succ in &graph.successors[node] {
            indegree[succ] -= 1;
            if indegree[succ] == 0 {
                ready.insert((graph.orders[succ], succ));
            }
        }
    }

    if sorted.len() == graph.len() {
        return SortOutcome::Sorted(sorted);
    }

    let mut residual: Vec<usize> = (0..graph.len()).filter(|&i| !done[i]).collect();
    residual.sort_by_key(|&i| graph.orders[i]);
    let cycles = residual
        .iter()
        .map(|&i| {
            let mut succs: Vec<usize> = graph.successors[i]
                .iter()
                .copied()
                .filter(|&s| !done[s])
                .collect();
            succs.sort_by_key(|&s| graph.orders[s]);
            (i, succs)
        })
        .collect();
    SortOutcome::Cycle(cycles)
}
