//! Asset co-usage graph and community detection.
//!
//! Assets used together in the same project (or, lacking a project, the same
//! team) share an undirected edge weighted by how many groups they co-occur
//! in. Only strong edges (weight at or above the configured threshold) merge
//! assets into communities; weaker edges are still reported.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::config::DEFAULT_STRONG_CO_USAGE_WEIGHT;
use crate::records::Allocation;
use crate::union_find::UnionFind;
use crate::types::DbId;

/// What groups allocations together. Projects and teams never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Project(DbId),
    Team(DbId),
}

impl GroupKey {
    /// Prefer the project, fall back to the team.
    pub fn of(allocation: &Allocation) -> Option<Self> {
        allocation
            .project_id
            .map(Self::Project)
            .or(allocation.team_id.map(Self::Team))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: DbId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: DbId,
    pub target: DbId,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollaborationGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub communities: Vec<Vec<DbId>>,
    pub isolated_nodes: Vec<DbId>,
}

/// Build the graph with the default strong co-usage threshold.
pub fn build_collaboration_graph(allocations: &[Allocation]) -> CollaborationGraph {
    build_collaboration_graph_with(allocations, DEFAULT_STRONG_CO_USAGE_WEIGHT)
}

/// Build the graph, merging communities over edges of at least `strong_weight`.
pub fn build_collaboration_graph_with(
    allocations: &[Allocation],
    strong_weight: u32,
) -> CollaborationGraph {
    let mut groups: BTreeMap<GroupKey, BTreeSet<DbId>> = BTreeMap::new();
    for alloc in allocations {
        if let (Some(key), Some(asset_id)) = (GroupKey::of(alloc), alloc.asset_id) {
            groups.entry(key).or_default().insert(asset_id);
        }
    }

    let mut weights: BTreeMap<(DbId, DbId), u32> = BTreeMap::new();
    let mut all_nodes: BTreeSet<DbId> = BTreeSet::new();
    for members in groups.values() {
        all_nodes.extend(members.iter().copied());
        let members: Vec<DbId> = members.iter().copied().collect();
        for (i, a) in members.iter().enumerate() {
            // Sorted set: a < b for every later member.
            for b in &members[i + 1..] {
                *weights.entry((*a, *b)).or_insert(0) += 1;
            }
        }
    }

    let nodes: Vec<DbId> = all_nodes.into_iter().collect();
    let index: HashMap<DbId, usize> = nodes.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut forest = UnionFind::new(nodes.len());
    let mut touched = vec![false; nodes.len()];
    for (&(a, b), &weight) in &weights {
        let (ia, ib) = (index[&a], index[&b]);
        touched[ia] = true;
        touched[ib] = true;
        if weight >= strong_weight {
            forest.union(ia, ib);
        }
    }

    let mut classes: BTreeMap<usize, Vec<DbId>> = BTreeMap::new();
    for (i, id) in nodes.iter().enumerate() {
        classes.entry(forest.find(i)).or_default().push(*id);
    }
    let mut communities: Vec<Vec<DbId>> = classes
        .into_values()
        .filter(|members| members.len() > 1)
        .collect();
    // Members are already ascending; order communities by smallest member.
    communities.sort_by_key(|members| members[0]);

    let isolated_nodes = nodes
        .iter()
        .zip(&touched)
        .filter(|(_, touched)| !**touched)
        .map(|(id, _)| *id)
        .collect();

    CollaborationGraph {
        nodes: nodes
            .iter()
            .map(|id| GraphNode {
                id: *id,
                label: format!("Asset {id}"),
            })
            .collect(),
        edges: weights
            .into_iter()
            .map(|((source, target), weight)| GraphEdge {
                source,
                target,
                weight,
            })
            .collect(),
        communities,
        isolated_nodes,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn on_project(asset_id: DbId, project_id: DbId) -> Allocation {
        Allocation {
            asset_id: Some(asset_id),
            project_id: Some(project_id),
            team_id: Some(1),
            ..Allocation::default()
        }
    }

    fn on_team(asset_id: DbId, team_id: DbId) -> Allocation {
        Allocation {
            asset_id: Some(asset_id),
            team_id: Some(team_id),
            ..Allocation::default()
        }
    }

    // -- GroupKey --

    #[test]
    fn group_key_prefers_project() {
        assert_eq!(GroupKey::of(&on_project(1, 7)), Some(GroupKey::Project(7)));
        assert_eq!(GroupKey::of(&on_team(1, 7)), Some(GroupKey::Team(7)));
        assert_eq!(GroupKey::of(&Allocation::default()), None);
    }

    // -- build_collaboration_graph --

    #[test]
    fn edge_weights_accumulate_across_groups() {
        let allocations = vec![
            on_project(1, 10),
            on_project(2, 10),
            on_project(2, 11),
            on_project(1, 11),
            on_project(3, 11),
        ];
        let graph = build_collaboration_graph(&allocations);

        assert_eq!(
            graph.edges,
            vec![
                GraphEdge { source: 1, target: 2, weight: 2 },
                GraphEdge { source: 1, target: 3, weight: 1 },
                GraphEdge { source: 2, target: 3, weight: 1 },
            ]
        );
        assert_eq!(graph.communities, vec![vec![1, 2]]);
        assert!(graph.isolated_nodes.is_empty());
    }

    #[test]
    fn weak_edges_neither_merge_nor_isolate() {
        let allocations = vec![on_team(1, 5), on_team(2, 5), on_team(3, 6)];
        let graph = build_collaboration_graph(&allocations);

        assert_eq!(graph.edges.len(), 1);
        assert!(graph.communities.is_empty());
        assert_eq!(graph.isolated_nodes, vec![3]);
        let ids: Vec<DbId> = graph.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(graph.nodes[0].label, "Asset 1");
    }

    #[test]
    fn project_and_team_keys_do_not_collide() {
        let allocations = vec![
            on_project(1, 7),
            Allocation {
                asset_id: Some(2),
                team_id: Some(7),
                ..Allocation::default()
            },
        ];
        let graph = build_collaboration_graph(&allocations);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.isolated_nodes, vec![1, 2]);
    }

    #[test]
    fn duplicate_allocations_in_a_group_count_once() {
        let allocations = vec![
            on_project(1, 10),
            on_project(1, 10),
            on_project(2, 10),
        ];
        let graph = build_collaboration_graph(&allocations);
        assert_eq!(graph.edges[0].weight, 1);
    }

    #[test]
    fn communities_are_disjoint_and_chain_through_strong_edges() {
        let mut allocations = Vec::new();
        for project in [1, 2] {
            allocations.push(on_project(10, project));
            allocations.push(on_project(11, project));
            allocations.push(on_project(20, project + 100));
            allocations.push(on_project(21, project + 100));
        }
        for project in [3, 4] {
            allocations.push(on_project(11, project));
            allocations.push(on_project(12, project));
        }
        let graph = build_collaboration_graph(&allocations);

        assert_eq!(graph.communities, vec![vec![10, 11, 12], vec![20, 21]]);
        let mut seen = BTreeSet::new();
        for member in graph.communities.iter().flatten() {
            assert!(seen.insert(*member));
        }
    }

    #[test]
    fn custom_threshold_merges_weak_edges() {
        let allocations = vec![on_team(1, 5), on_team(2, 5)];
        let graph = build_collaboration_graph_with(&allocations, 1);
        assert_eq!(graph.communities, vec![vec![1, 2]]);
    }

    #[test]
    fn allocations_without_asset_or_group_skipped() {
        let allocations = vec![
            Allocation {
                asset_id: None,
                project_id: Some(1),
                ..Allocation::default()
            },
            Allocation {
                asset_id: Some(4),
                ..Allocation::default()
            },
        ];
        let graph = build_collaboration_graph(&allocations);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }
}
