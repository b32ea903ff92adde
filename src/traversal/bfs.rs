//! Level-synchronous breadth-first search over a [`NeighborSource`].
//!
//! One `expand` call per level. A single visited set covers the whole
//! search: the first time a node is reached is at its minimal hop distance,
//! so parent pointers always describe a shortest path and no node can occur
//! twice in it.

use super::source::{Adjacent, NeighborSource};
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// One hop of a path: the node reached and the edge used to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub node_id: Uuid,
    /// `(edge_id, edge_type)`; `None` on the start node
    pub via: Option<(Uuid, String)>,
}

/// Shortest undirected path from `from` to `to` using at most `max_depth`
/// edges. `None` when `to` is not reachable within the ceiling.
///
/// Neighbors are visited in `(from, to, edge_id)` order, so ties between
/// equally short paths are broken the same way on every backend.
pub async fn shortest_path(
    source: &dyn NeighborSource,
    from: Uuid,
    to: Uuid,
    max_depth: usize,
) -> Result<Option<Vec<Hop>>> {
    if from == to {
        return Ok(Some(vec![Hop {
            node_id: from,
            via: None,
        }]));
    }

    let mut visited: HashSet<Uuid> = HashSet::from([from]);
    let mut parents: HashMap<Uuid, Adjacent> = HashMap::new();
    let mut frontier = vec![from];

    for _ in 0..max_depth {
        if frontier.is_empty() {
            break;
        }
        let mut moves = source.expand(&frontier).await?;
        moves.sort();

        let mut next = Vec::new();
        for step in moves {
            if !visited.insert(step.to) {
                continue;
            }
            let reached = step.to;
            parents.insert(reached, step);
            if reached == to {
                return Ok(Some(unwind(&parents, from, to)));
            }
            next.push(reached);
        }
        frontier = next;
    }

    Ok(None)
}

/// Every node within `depth` undirected hops of `center`, center first,
/// then in discovery order.
pub async fn reachable(
    source: &dyn NeighborSource,
    center: Uuid,
    depth: usize,
) -> Result<Vec<Uuid>> {
    let mut visited: HashSet<Uuid> = HashSet::from([center]);
    let mut order = vec![center];
    let mut frontier = vec![center];

    for _ in 0..depth {
        if frontier.is_empty() {
            break;
        }
        let mut moves = source.expand(&frontier).await?;
        moves.sort();

        let mut next = Vec::new();
        for step in moves {
            if visited.insert(step.to) {
                order.push(step.to);
                next.push(step.to);
            }
        }
        frontier = next;
    }

    Ok(order)
}

fn unwind(parents: &HashMap<Uuid, Adjacent>, from: Uuid, to: Uuid) -> Vec<Hop> {
    let mut hops = Vec::new();
    let mut current = to;
    while current != from {
        // Every node but `from` on the chain was inserted with a parent
        let Some(step) = parents.get(&current) else {
            break;
        };
        hops.push(Hop {
            node_id: current,
            via: Some((step.edge_id, step.edge_type.clone())),
        });
        current = step.from;
    }
    hops.push(Hop {
        node_id: from,
        via: None,
    });
    hops.reverse();
    hops
}
