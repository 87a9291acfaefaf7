use crate::grouping::{GroupPath, Grouping};
use crate::node::{NodeKind, ROOT_ID, Tree, TreeNode};
use assetdex_catalog::Package;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Builds the display tree for a filtered, ordered package list.
///
/// `filtered` is taken in its current order for ungrouped output. `full` is
/// the unfiltered package set; it supplies parents the filter dropped and
/// the packages feature bundles point at.
///
/// The result depends only on the arguments, so calling this twice with the
/// same input yields identical trees.
pub fn materialize(filtered: &[Package], grouping: Grouping, full: &[Package]) -> Tree {
    let full_by_id: HashMap<i64, &Package> = full.iter().map(|p| (p.id, p)).collect();

    let mut present: HashSet<i64> = HashSet::with_capacity(filtered.len());
    let mut data: Vec<&Package> = Vec::with_capacity(filtered.len());
    for package in filtered {
        if present.insert(package.id) {
            data.push(package);
        }
    }

    // Appended parents are visited by the same loop, which pulls in
    // grandparents as well.
    let mut index = 0;
    while index < data.len() {
        let package = data[index];
        index += 1;
        if package.parent_id <= 0 || present.contains(&package.parent_id) {
            continue;
        }
        match full_by_id.get(&package.parent_id) {
            Some(parent) => {
                present.insert(parent.id);
                data.push(parent);
            }
            None => warn!(
                package = %package.display_name,
                parent_id = package.parent_id,
                "Parent package missing from catalog; showing sub-package without it"
            ),
        }
    }

    let parent_of: HashMap<i64, i64> = data
        .iter()
        .filter(|p| p.parent_id > 0 && p.parent_id != p.id && present.contains(&p.parent_id))
        .map(|p| (p.id, p.parent_id))
        .collect();

    let mut children: HashMap<i64, Vec<&Package>> = HashMap::new();
    let mut top_level: Vec<&Package> = Vec::new();
    for &package in &data {
        match parent_of.get(&package.id) {
            Some(&parent) if reaches_top(package.id, &parent_of) => {
                children.entry(parent).or_default().push(package);
            }
            Some(_) => {
                warn!(
                    package = %package.display_name,
                    "Cyclic package hierarchy; showing package at top level"
                );
                top_level.push(package);
            }
            None => top_level.push(package),
        }
    }
    for siblings in children.values_mut() {
        siblings.sort_by_cached_key(|p| (p.display_name.to_lowercase(), p.id));
    }

    let lowest = filtered
        .iter()
        .chain(full.iter())
        .map(|p| p.id)
        .min()
        .unwrap_or(0)
        .min(ROOT_ID);

    let mut builder = Builder {
        children,
        bundle_members: full.iter().map(|p| (p.safe_name.as_str(), p)).collect(),
        next_synthetic: lowest - 1,
        emitted: HashSet::new(),
        nodes: vec![TreeNode::root()],
    };

    if grouping == Grouping::None {
        for package in top_level {
            builder.emit_package(package, ROOT_ID, 0);
        }
    } else {
        builder.emit_grouped(&top_level, grouping);
    }

    debug!(
        filtered = filtered.len(),
        nodes = builder.nodes.len() - 1,
        ?grouping,
        "materialized package tree"
    );
    Tree::new(builder.nodes)
}

/// Whether following `parent_of` from `id` ends at a package without a
/// present parent, as opposed to looping.
fn reaches_top(id: i64, parent_of: &HashMap<i64, i64>) -> bool {
    let mut current = id;
    for _ in 0..=parent_of.len() {
        match parent_of.get(&current) {
            Some(&parent) => current = parent,
            None => return true,
        }
    }
    false
}

struct Builder<'a> {
    children: HashMap<i64, Vec<&'a Package>>,
    bundle_members: HashMap<&'a str, &'a Package>,
    next_synthetic: i64,
    /// Package ids that already own a node.
    emitted: HashSet<i64>,
    nodes: Vec<TreeNode>,
}

impl<'a> Builder<'a> {
    fn synthetic_id(&mut self) -> i64 {
        let id = self.next_synthetic;
        self.next_synthetic -= 1;
        id
    }

    fn emit_grouped(&mut self, top_level: &[&'a Package], grouping: Grouping) {
        let mut entries: Vec<((bool, Vec<String>), GroupPath, &'a Package)> = top_level
            .iter()
            .flat_map(|&package| {
                grouping
                    .paths(package)
                    .into_iter()
                    .map(move |path| (path.sort_key(), path, package))
            })
            .collect();
        entries.sort_by_cached_key(|(key, _, package)| {
            (key.clone(), package.display_name.to_lowercase(), package.id)
        });

        // Segments are matched on the sort key, so spellings that differ only
        // in case share one group labelled with the first spelling emitted.
        let mut previous: &[String] = &[];
        let mut open_groups: Vec<i64> = Vec::new();
        for ((_, key), path, package) in &entries {
            let package = *package;
            let shared = previous
                .iter()
                .zip(key)
                .take_while(|(a, b)| a == b)
                .count();
            open_groups.truncate(shared);
            for (depth, segment) in path.segments.iter().enumerate().skip(shared) {
                let id = self.synthetic_id();
                self.nodes.push(TreeNode {
                    id,
                    parent_id: open_groups.last().copied().unwrap_or(ROOT_ID),
                    depth: depth as i32,
                    label: segment.clone(),
                    kind: NodeKind::Group,
                    package: None,
                });
                open_groups.push(id);
            }
            previous = key;

            let parent = open_groups.last().copied().unwrap_or(ROOT_ID);
            self.emit_package(package, parent, path.segments.len() as i32);
        }
    }

    /// Pushes `package`, its bundle members and its sub-packages depth first.
    ///
    /// A package already in the tree (tag grouping lists it once per tag)
    /// is pushed again under a synthetic id, so node ids stay unique and
    /// every `parent_id` names exactly one node.
    fn emit_package(&mut self, package: &'a Package, parent_id: i64, depth: i32) {
        let id = if self.emitted.insert(package.id) {
            package.id
        } else {
            self.synthetic_id()
        };
        self.nodes.push(TreeNode {
            id,
            parent_id,
            depth,
            label: package.display_name.clone(),
            kind: NodeKind::Package,
            package: Some(package.clone()),
        });

        for safe_name in &package.bundled {
            let Some(&member) = self.bundle_members.get(safe_name.as_str()) else {
                continue;
            };
            let member_id = self.synthetic_id();
            self.nodes.push(TreeNode {
                id: member_id,
                parent_id: id,
                depth: depth + 1,
                label: member.display_name.clone(),
                kind: NodeKind::BundleMember,
                package: Some(member.clone()),
            });
        }

        let children = self.children.get(&package.id).cloned().unwrap_or_default();
        for child in children {
            self.emit_package(child, id, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdex_catalog::SourceKind;
    use pretty_assertions::assert_eq;

    fn package(id: i64, name: &str) -> Package {
        Package::new(id, name, SourceKind::StorePackage)
    }

    fn shape(tree: &Tree) -> Vec<(i64, i64, i32, String)> {
        tree.iter()
            .map(|n| (n.id, n.parent_id, n.depth, n.label.clone()))
            .collect()
    }

    #[test]
    fn ungrouped_keeps_input_order() {
        let packages = vec![package(3, "Zeta"), package(1, "Alpha"), package(2, "Mid")];
        let tree = materialize(&packages, Grouping::None, &packages);
        assert_eq!(
            shape(&tree),
            vec![
                (3, 0, 0, "Zeta".to_string()),
                (1, 0, 0, "Alpha".to_string()),
                (2, 0, 0, "Mid".to_string()),
            ]
        );
        assert_eq!(tree.nodes()[0].kind, NodeKind::Root);
        assert_eq!(tree.top_level_package_count(), 3);
    }

    #[test]
    fn synthetic_ids_stay_below_virtual_packages() {
        let packages = vec![
            package(-4, "Virtual").with_category("Registry"),
            package(2, "Real").with_category("Registry"),
        ];
        let tree = materialize(&packages, Grouping::Category, &packages);
        let group = &tree.nodes()[1];
        assert_eq!(group.kind, NodeKind::Group);
        assert_eq!(group.id, -5);
        assert_eq!(tree.top_level_package_count(), 1);
    }

    #[test]
    fn cyclic_parents_do_not_loop() {
        let packages = vec![package(1, "A").with_parent(2), package(2, "B").with_parent(1)];
        let tree = materialize(&packages, Grouping::None, &packages);
        assert_eq!(tree.len(), 2);
        assert!(tree.iter().all(|n| n.depth == 0));
    }

    #[test]
    fn reaches_top_detects_loops() {
        let chain = HashMap::from([(3, 2), (2, 1)]);
        assert!(reaches_top(3, &chain));
        let cycle = HashMap::from([(1, 2), (2, 1)]);
        assert!(!reaches_top(1, &cycle));
    }
}
