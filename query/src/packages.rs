//! Flat package listing, the input side of tree materialization.

use crate::compiler::{QueryCompiler, Statement, direction, non_blank};
use crate::error::Result;
use crate::filter::TagSelector;
use crate::phrase::parse_phrase;
use crate::predicate::{
    Predicate, QueryPlan, TextColumns, not_excluded, tag_clause, text_predicates,
};
use assetdex_catalog::projection::package_select;
use assetdex_catalog::{SourceKind, TagTarget, safe_name};
use serde::{Deserialize, Serialize};
use tracing::debug;

const PACKAGE_ANY_COLUMNS: [&str; 2] = ["p.display_name", "p.publisher"];

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PackageFilter {
    /// Same phrase grammar as file search, matched against display names.
    pub phrase: String,
    pub include_excluded: bool,
    pub publisher: Option<String>,
    pub category: Option<String>,
    pub source: Option<SourceKind>,
    pub tag: TagSelector,
    pub sort: PackageSort,
    pub descending: bool,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PackageSort {
    #[default]
    Name,
    Publisher,
    Category,
    Size,
    Price,
}

impl PackageSort {
    pub fn column(self) -> &'static str {
        match self {
            PackageSort::Name => "p.display_name",
            PackageSort::Publisher => "p.publisher",
            PackageSort::Category => "p.category",
            PackageSort::Size => "p.size",
            PackageSort::Price => "p.price",
        }
    }
}

/// Compiled package listing. Not paged: the tree needs the whole set.
#[derive(Clone, Debug, PartialEq)]
pub struct PackageQuery {
    plan: QueryPlan,
    order_by: String,
}

impl PackageQuery {
    pub fn predicates(&self) -> Vec<String> {
        self.plan.fragments()
    }

    pub fn statement(&self) -> Statement {
        Statement {
            sql: format!(
                "{}{}{} ORDER BY {}",
                package_select(),
                self.plan.render_joins(),
                self.plan.render_where(),
                self.order_by
            ),
            params: self.plan.params(),
            predicates: self.plan.fragments(),
        }
    }
}

impl QueryCompiler {
    pub fn compile_packages(&self, filter: &PackageFilter) -> Result<PackageQuery> {
        let mut plan = QueryPlan::default();
        if !filter.include_excluded {
            plan.push(not_excluded());
        }

        plan.extend(text_predicates(
            &parse_phrase(&filter.phrase),
            TextColumns {
                primary: "p.display_name",
                any: &PACKAGE_ANY_COLUMNS,
            },
            self.config().allow_raw_predicates,
        )?);

        if let Some(publisher) = non_blank(filter.publisher.as_deref()) {
            plan.push(Predicate::new(
                "p.safe_publisher = ?",
                vec![safe_name(publisher).into()],
            ));
        }
        if let Some(category) = non_blank(filter.category.as_deref()) {
            plan.push(Predicate::new(
                "p.safe_category = ?",
                vec![safe_name(category).into()],
            ));
        }
        if let Some(source) = filter.source {
            plan.push(Predicate::new("p.source = ?", vec![source.code().into()]));
        }
        plan.apply(tag_clause(filter.tag, TagTarget::Package, "p.id", "pta"));

        let dir = direction(filter.descending);
        let order_by = format!("{} {dir}, p.safe_name ASC, p.id ASC", filter.sort.column());

        debug!(predicates = plan.predicates.len(), "compiled package query");
        Ok(PackageQuery { plan, order_by })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use assetdex_catalog::SqlValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn package_listing_escapes_and_orders() {
        let compiler = QueryCompiler::new(QueryConfig::default()).expect("config");
        let query = compiler
            .compile_packages(&PackageFilter {
                phrase: "~ui_kit".to_string(),
                category: Some("Tools/UI".to_string()),
                sort: PackageSort::Price,
                descending: true,
                ..Default::default()
            })
            .expect("compile");
        let statement = query.statement();
        assert_eq!(
            statement.predicates,
            vec![
                "p.exclude = 0".to_string(),
                "p.display_name LIKE ? ESCAPE '\\'".to_string(),
                "p.safe_category = ?".to_string(),
            ]
        );
        assert_eq!(
            statement.params,
            vec![SqlValue::from("%ui\\_kit%"), SqlValue::from("Tools_UI")]
        );
        assert!(statement.sql.ends_with("ORDER BY p.price DESC, p.safe_name ASC, p.id ASC"));
    }

    #[test]
    fn untagged_packages() {
        let compiler = QueryCompiler::new(QueryConfig::default()).expect("config");
        let query = compiler
            .compile_packages(&PackageFilter {
                tag: TagSelector::Untagged,
                include_excluded: true,
                ..Default::default()
            })
            .expect("compile");
        assert_eq!(query.predicates().len(), 1);
        assert!(query.predicates()[0].starts_with("NOT EXISTS"));
    }
}
