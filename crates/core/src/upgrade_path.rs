//! Upgrade / replacement path search over the asset catalog.
//!
//! Breadth-first search from every catalog entry in the starting category
//! along `prerequisite -> successor` edges, stopping at entries whose specs
//! meet the target. Each node is visited at most once, so the first path to
//! reach it is the only one explored through it.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::DEFAULT_MAX_UPGRADE_PATHS;
use crate::records::{CatalogEntry, SpecMap};
use crate::spec_match::meets_all;
use crate::types::DbId;

/// An ordered chain of catalog ids, from a start entry to a qualifying entry.
pub type UpgradePath = Vec<DbId>;

/// Find up to [`DEFAULT_MAX_UPGRADE_PATHS`] shortest upgrade paths.
pub fn find_upgrade_paths(
    current_category: &str,
    target_spec: &SpecMap,
    catalog: &[CatalogEntry],
) -> Vec<UpgradePath> {
    find_upgrade_paths_limited(
        current_category,
        target_spec,
        catalog,
        DEFAULT_MAX_UPGRADE_PATHS,
    )
}

/// Same as [`find_upgrade_paths`] with an explicit result cap.
pub fn find_upgrade_paths_limited(
    current_category: &str,
    target_spec: &SpecMap,
    catalog: &[CatalogEntry],
    max_paths: usize,
) -> Vec<UpgradePath> {
    if catalog.is_empty() || max_paths == 0 {
        return Vec::new();
    }

    let by_id: HashMap<DbId, &CatalogEntry> = catalog.iter().map(|e| (e.id, e)).collect();

    let mut successors: HashMap<DbId, Vec<DbId>> = HashMap::new();
    for entry in catalog {
        for prereq in &entry.prerequisites {
            successors.entry(*prereq).or_default().push(entry.id);
        }
    }

    let wanted = current_category.to_lowercase();
    let starts: Vec<DbId> = catalog
        .iter()
        .filter(|e| e.category.to_lowercase() == wanted)
        .map(|e| e.id)
        .collect();
    if starts.is_empty() {
        return Vec::new();
    }

    let mut visited: HashSet<DbId> = starts.iter().copied().collect();
    let mut queue: VecDeque<UpgradePath> = starts.into_iter().map(|id| vec![id]).collect();
    let mut found = Vec::new();

    while let Some(path) = queue.pop_front() {
        if found.len() >= max_paths {
            break;
        }
        let Some(&current) = path.last() else {
            continue;
        };

        let qualifies = by_id
            .get(&current)
            .is_some_and(|entry| meets_all(&entry.specifications, target_spec));
        if qualifies {
            found.push(path);
            continue;
        }

        for next in successors.get(&current).into_iter().flatten() {
            if visited.insert(*next) {
                let mut extended = path.clone();
                extended.push(*next);
                queue.push_back(extended);
            }
        }
    }

    found
}
