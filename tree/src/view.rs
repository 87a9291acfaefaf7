use crate::grouping::Grouping;
use crate::materialize::materialize;
use crate::node::Tree;
use assetdex_catalog::Package;
use tracing::trace;

/// Events that make a cached tree stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidationReason {
    FilterChanged,
    SortChanged,
    GroupingChanged,
    TagsChanged,
    CatalogChanged,
    ViewModeToggled,
}

/// Caller-owned cache of the last materialized tree.
///
/// The tree is rebuilt on the next [`MaterializedView::tree`] call after any
/// invalidation; until then the previous tree is returned as is.
#[derive(Debug, Default)]
pub struct MaterializedView {
    grouping: Grouping,
    tree: Option<Tree>,
    pending: Vec<InvalidationReason>,
    rebuilds: u64,
}

impl MaterializedView {
    pub fn new(grouping: Grouping) -> Self {
        Self {
            grouping,
            ..Default::default()
        }
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    pub fn set_grouping(&mut self, grouping: Grouping) {
        if self.grouping != grouping {
            self.grouping = grouping;
            self.invalidate(InvalidationReason::GroupingChanged);
        }
    }

    pub fn invalidate(&mut self, reason: InvalidationReason) {
        trace!(?reason, "tree invalidated");
        if !self.pending.contains(&reason) {
            self.pending.push(reason);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.tree.is_none() || !self.pending.is_empty()
    }

    /// Reasons collected since the last rebuild.
    pub fn pending(&self) -> &[InvalidationReason] {
        &self.pending
    }

    /// Number of times the tree has been built.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Returns the cached tree, rebuilding it first when dirty.
    pub fn tree(&mut self, filtered: &[Package], full: &[Package]) -> &Tree {
        let grouping = self.grouping;
        if self.is_dirty() {
            self.pending.clear();
            self.rebuilds += 1;
            self.tree = None;
        }
        self.tree
            .get_or_insert_with(|| materialize(filtered, grouping, full))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdex_catalog::SourceKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn rebuilds_only_when_dirty() {
        let packages = vec![Package::new(1, "Kit", SourceKind::StorePackage)];
        let mut view = MaterializedView::new(Grouping::None);
        assert!(view.is_dirty());

        assert_eq!(view.tree(&packages, &packages).len(), 1);
        assert_eq!(view.rebuilds(), 1);
        assert!(!view.is_dirty());

        view.tree(&[], &packages);
        assert_eq!(view.rebuilds(), 1, "clean view keeps the cached tree");

        view.invalidate(InvalidationReason::FilterChanged);
        view.invalidate(InvalidationReason::FilterChanged);
        view.invalidate(InvalidationReason::TagsChanged);
        assert_eq!(
            view.pending(),
            &[InvalidationReason::FilterChanged, InvalidationReason::TagsChanged]
        );
        assert!(view.tree(&[], &packages).is_empty());
        assert_eq!(view.rebuilds(), 2);
    }

    #[test]
    fn same_grouping_is_not_a_change() {
        let mut view = MaterializedView::new(Grouping::Category);
        view.tree(&[], &[]);
        view.set_grouping(Grouping::Category);
        assert!(!view.is_dirty());
        view.set_grouping(Grouping::Tag);
        assert_eq!(view.pending(), &[InvalidationReason::GroupingChanged]);
    }
}
