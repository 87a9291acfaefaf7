use assetdex_catalog::Package;
use serde::Serialize;

/// Id of the root node; top-level nodes point at it.
pub const ROOT_ID: i64 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    /// Synthetic label for one segment of a group path.
    Group,
    Package,
    /// Synthetic, read-only entry for a package pulled in by a feature
    /// bundle.
    BundleMember,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TreeNode {
    /// Package id for package nodes, a negative synthetic id for group and
    /// bundle member nodes and for repeated package nodes. Unique within a
    /// tree; `package` always carries the real record.
    pub id: i64,
    pub parent_id: i64,
    /// -1 for the root, 0 for top-level nodes.
    pub depth: i32,
    pub label: String,
    pub kind: NodeKind,
    pub package: Option<Package>,
}

impl TreeNode {
    pub(crate) fn root() -> Self {
        Self {
            id: ROOT_ID,
            parent_id: ROOT_ID,
            depth: -1,
            label: String::new(),
            kind: NodeKind::Root,
            package: None,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        !matches!(self.kind, NodeKind::Package)
    }
}

/// Depth-first flattened forest. `nodes()[0]` is always the root and every
/// node's descendants occupy the positions directly after it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    pub(crate) fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Nodes below the root, in display order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().skip(1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Real packages that are not sub-packages of another package. A package
    /// shown under several groups counts once.
    pub fn top_level_package_count(&self) -> usize {
        self.iter()
            .filter(|node| node.kind == NodeKind::Package && node.id > 0)
            .filter(|node| node.package.as_ref().is_some_and(|p| p.parent_id == 0))
            .count()
    }

    /// Ids of the direct children of `parent_id`, in display order.
    pub fn children_of(&self, parent_id: i64) -> Vec<i64> {
        self.iter()
            .filter(|node| node.parent_id == parent_id)
            .map(|node| node.id)
            .collect()
    }
}
