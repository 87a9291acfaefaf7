use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::filter::{FilterState, SortField};
use crate::phrase::parse_phrase;
use crate::predicate::{
    Predicate, QueryPlan, RangeKind, TextColumns, not_excluded, one_of, preview_predicate,
    range_predicates, tag_clause, text_predicates,
};
use assetdex_catalog::projection::{file_count_select, file_row_select};
use assetdex_catalog::{SqlValue, TagTarget, safe_name};
use serde::Serialize;
use tracing::debug;

/// Columns an unprefixed search token may match in file mode.
const FILE_ANY_COLUMNS: [&str; 2] = ["f.path", "f.description"];

/// A SQL statement ready for a [`assetdex_catalog::CatalogStore`].
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
    /// WHERE fragments in the order they were added.
    pub predicates: Vec<String>,
}

/// Effective page window after clamping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    pub offset: u64,
}

/// Output of [`QueryCompiler::compile`]: one predicate plan from which both
/// the count and the page statement are rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledQuery {
    plan: QueryPlan,
    order_by: String,
    pagination: Pagination,
}

impl CompiledQuery {
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn predicates(&self) -> Vec<String> {
        self.plan.fragments()
    }

    pub fn count_query(&self) -> Statement {
        Statement {
            sql: format!(
                "{}{}{}",
                file_count_select(),
                self.plan.render_joins(),
                self.plan.render_where()
            ),
            params: self.plan.params(),
            predicates: self.plan.fragments(),
        }
    }

    pub fn page_query(&self) -> Statement {
        let mut params = self.plan.params();
        params.push(SqlValue::Integer(i64::from(self.pagination.page_size)));
        params.push(SqlValue::Integer(
            i64::try_from(self.pagination.offset).unwrap_or(i64::MAX),
        ));
        Statement {
            sql: format!(
                "{}{}{} ORDER BY {} LIMIT ? OFFSET ?",
                file_row_select(),
                self.plan.render_joins(),
                self.plan.render_where(),
                self.order_by
            ),
            params,
            predicates: self.plan.fragments(),
        }
    }
}

/// Turns [`FilterState`] snapshots into parameterized catalog statements.
#[derive(Clone, Debug)]
pub struct QueryCompiler {
    config: QueryConfig,
}

impl QueryCompiler {
    pub fn new(config: QueryConfig) -> Result<Self> {
        config.validate().map_err(QueryError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Clamps the requested window to the configured ceiling.
    ///
    /// A page size of 0 or above the ceiling becomes the ceiling; page 0 is
    /// read as page 1.
    pub fn pagination(&self, page: u32, page_size: u32) -> Pagination {
        let ceiling = self.config.max_page_size;
        let page_size = if page_size == 0 || page_size > ceiling {
            ceiling
        } else {
            page_size
        };
        let page = page.max(1);
        Pagination {
            page,
            page_size,
            offset: u64::from(page - 1) * u64::from(page_size),
        }
    }

    pub fn compile(&self, filter: &FilterState) -> Result<CompiledQuery> {
        let mut plan = QueryPlan::default();

        if !filter.include_excluded {
            plan.push(not_excluded());
        }

        let primary = self.config.search_field.column();
        plan.extend(text_predicates(
            &parse_phrase(&filter.phrase),
            TextColumns {
                primary,
                any: &FILE_ANY_COLUMNS,
            },
            self.config.allow_raw_predicates,
        )?);

        if let Some(selector) = filter.file_type.as_deref() {
            let types = self
                .config
                .resolve_types(selector)
                .into_iter()
                .map(SqlValue::Text)
                .collect();
            plan.extend(one_of("f.file_type", types));
        }

        if let Some(package_id) = filter.package_id {
            plan.push(Predicate::new("p.id = ?", vec![package_id.into()]));
        }
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

        plan.apply(tag_clause(filter.package_tag, TagTarget::Package, "p.id", "pta"));
        plan.apply(tag_clause(filter.file_tag, TagTarget::File, "f.id", "fta"));
        plan.extend(preview_predicate(filter.preview));

        plan.extend(range_predicates("f.width", &filter.width, RangeKind::Integer));
        plan.extend(range_predicates("f.height", &filter.height, RangeKind::Integer));
        plan.extend(range_predicates("f.length", &filter.length, RangeKind::Real));
        plan.extend(range_predicates("f.size", &filter.size, RangeKind::Kilobytes));

        let order_by = file_order_by(filter.sort, filter.descending);
        let pagination = self.pagination(filter.page, filter.page_size);

        debug!(
            predicates = plan.predicates.len(),
            joins = plan.joins.len(),
            page = pagination.page,
            page_size = pagination.page_size,
            "compiled file query"
        );

        Ok(CompiledQuery {
            plan,
            order_by,
            pagination,
        })
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn direction(descending: bool) -> &'static str {
    if descending { "DESC" } else { "ASC" }
}

/// User key first, then path and id so equal keys page deterministically.
fn file_order_by(sort: SortField, descending: bool) -> String {
    let dir = direction(descending);
    match sort {
        SortField::Path => format!("f.path {dir}, f.id ASC"),
        other => format!("{} {dir}, f.path ASC, f.id ASC", other.column()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{RangeFilter, TagSelector};
    use pretty_assertions::assert_eq;

    fn compiler() -> QueryCompiler {
        QueryCompiler::new(QueryConfig {
            max_page_size: 100,
            ..Default::default()
        })
        .expect("valid config")
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = QueryCompiler::new(QueryConfig {
            max_page_size: 0,
            ..Default::default()
        })
        .expect_err("zero ceiling");
        assert!(matches!(err, QueryError::InvalidConfig(_)));
    }

    #[test]
    fn pagination_clamps_and_offsets() {
        let compiler = compiler();
        assert_eq!(
            compiler.pagination(0, 0),
            Pagination {
                page: 1,
                page_size: 100,
                offset: 0
            }
        );
        assert_eq!(compiler.pagination(3, 500).page_size, 100);
        assert_eq!(compiler.pagination(3, 25).offset, 50);
    }

    #[test]
    fn empty_filter_only_hides_excluded() {
        let query = compiler().compile(&FilterState::default()).expect("compile");
        assert_eq!(query.predicates(), vec!["p.exclude = 0".to_string()]);

        let all = compiler()
            .compile(&FilterState {
                include_excluded: true,
                ..Default::default()
            })
            .expect("compile");
        assert!(all.predicates().is_empty());
        assert!(!all.count_query().sql.contains("WHERE"));
    }

    #[test]
    fn count_and_page_share_predicates() {
        let filter = FilterState {
            phrase: "+car -toy wheel".to_string(),
            file_type: Some("Images".to_string()),
            publisher: Some("Acme Tools".to_string()),
            package_tag: TagSelector::Tag(4),
            file_tag: TagSelector::Untagged,
            width: RangeFilter::at_least("64"),
            size: RangeFilter::at_most("abc"),
            page: 2,
            page_size: 10,
            ..Default::default()
        };
        let query = compiler().compile(&filter).expect("compile");
        let count = query.count_query();
        let page = query.page_query();

        assert_eq!(count.predicates, page.predicates);
        assert_eq!(page.params.len(), count.params.len() + 2);
        assert_eq!(&page.params[..count.params.len()], count.params.as_slice());
        assert_eq!(
            page.params[count.params.len()..].to_vec(),
            vec![SqlValue::Integer(10), SqlValue::Integer(10)]
        );
        assert_eq!(
            count.sql.matches('?').count(),
            count.params.len(),
            "placeholders and params line up"
        );
        assert!(count.params.contains(&SqlValue::Text("Acme_Tools".to_string())));
    }

    #[test]
    fn single_type_collapses_to_equality() {
        let query = compiler()
            .compile(&FilterState {
                file_type: Some("Prefabs".to_string()),
                ..Default::default()
            })
            .expect("compile");
        assert!(query.predicates().contains(&"f.file_type = ?".to_string()));
    }

    #[test]
    fn sort_appends_path_tiebreaker() {
        let query = compiler()
            .compile(&FilterState {
                sort: SortField::Size,
                descending: true,
                ..Default::default()
            })
            .expect("compile");
        assert!(
            query
                .page_query()
                .sql
                .contains("ORDER BY f.size DESC, f.path ASC, f.id ASC LIMIT ? OFFSET ?")
        );
    }

    #[test]
    fn raw_phrase_without_opt_in_fails_compile() {
        let err = compiler()
            .compile(&FilterState {
                phrase: "=f.size > 1".to_string(),
                ..Default::default()
            })
            .expect_err("raw mode disabled");
        assert!(matches!(err, QueryError::RawPredicateNotAllowed));
    }
}
