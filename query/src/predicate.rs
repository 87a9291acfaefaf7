//! Per-facet predicate builders.
//!
//! Every builder is a pure function from one facet value to fragments plus
//! the parameters they bind. A [`QueryPlan`] collects them in order and is
//! rendered once, so parameter order always follows fragment order.

use crate::error::{QueryError, Result};
use crate::filter::{PreviewSelector, RangeFilter, TagSelector};
use crate::phrase::{SearchPhrase, Token};
use assetdex_catalog::{PreviewState, SqlValue, TagTarget};

/// Escape character declared on every LIKE we emit.
pub const LIKE_ESCAPE: char = '\\';

/// One WHERE condition and the values it binds.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    pub fragment: String,
    pub params: Vec<SqlValue>,
}

impl Predicate {
    pub fn new(fragment: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            fragment: fragment.into(),
            params,
        }
    }

    pub fn bare(fragment: impl Into<String>) -> Self {
        Self::new(fragment, Vec::new())
    }
}

/// One JOIN clause and the values it binds.
#[derive(Clone, Debug, PartialEq)]
pub struct Join {
    pub clause: String,
    pub params: Vec<SqlValue>,
}

/// Ordered joins and predicates of one query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryPlan {
    pub joins: Vec<Join>,
    pub predicates: Vec<Predicate>,
}

impl QueryPlan {
    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn extend(&mut self, predicates: impl IntoIterator<Item = Predicate>) {
        self.predicates.extend(predicates);
    }

    pub fn apply(&mut self, clause: TagClause) {
        match clause {
            TagClause::None => {}
            TagClause::Join(join) => self.joins.push(join),
            TagClause::Predicate(predicate) => self.predicates.push(predicate),
        }
    }

    /// Join clauses, each preceded by a space.
    pub fn render_joins(&self) -> String {
        self.joins
            .iter()
            .map(|join| format!(" {}", join.clause))
            .collect()
    }

    /// ` WHERE (a) AND (b)` or an empty string.
    pub fn render_where(&self) -> String {
        if self.predicates.is_empty() {
            return String::new();
        }
        let body = self
            .predicates
            .iter()
            .map(|predicate| format!("({})", predicate.fragment))
            .collect::<Vec<_>>()
            .join(" AND ");
        format!(" WHERE {body}")
    }

    /// Parameters in the order their placeholders appear: joins first.
    pub fn params(&self) -> Vec<SqlValue> {
        self.joins
            .iter()
            .flat_map(|join| join.params.iter().cloned())
            .chain(
                self.predicates
                    .iter()
                    .flat_map(|predicate| predicate.params.iter().cloned()),
            )
            .collect()
    }

    pub fn fragments(&self) -> Vec<String> {
        self.predicates
            .iter()
            .map(|predicate| predicate.fragment.clone())
            .collect()
    }
}

/// Escapes LIKE metacharacters that must match literally: `_` and the
/// escape character itself. `%` keeps its wildcard meaning.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == LIKE_ESCAPE || ch == '_' {
            out.push(LIKE_ESCAPE);
        }
        out.push(ch);
    }
    out
}

/// `%value%` with metacharacters escaped.
pub fn contains_pattern(value: &str) -> SqlValue {
    SqlValue::Text(format!("%{}%", escape_like(value)))
}

fn like(column: &str) -> String {
    format!("{column} LIKE ? ESCAPE '{LIKE_ESCAPE}'")
}

fn not_like(column: &str) -> String {
    format!("{column} NOT LIKE ? ESCAPE '{LIKE_ESCAPE}'")
}

/// Columns a text phrase is matched against.
#[derive(Clone, Copy, Debug)]
pub struct TextColumns<'a> {
    /// Used by `~` phrases and `+`/`-` tokens.
    pub primary: &'a str,
    /// Any of these may satisfy an unprefixed token.
    pub any: &'a [&'a str],
}

pub fn text_predicates(
    phrase: &SearchPhrase,
    columns: TextColumns<'_>,
    allow_raw: bool,
) -> Result<Vec<Predicate>> {
    match phrase {
        SearchPhrase::Empty => Ok(Vec::new()),
        SearchPhrase::Raw(fragment) => {
            if !allow_raw {
                return Err(QueryError::RawPredicateNotAllowed);
            }
            Ok(vec![Predicate::bare(fragment.clone())])
        }
        SearchPhrase::Exact(text) => Ok(vec![Predicate::new(
            like(columns.primary),
            vec![contains_pattern(text)],
        )]),
        SearchPhrase::Tokens(tokens) => Ok(tokens
            .iter()
            .map(|token| token_predicate(token, columns))
            .collect()),
    }
}

fn token_predicate(token: &Token, columns: TextColumns<'_>) -> Predicate {
    match token {
        Token::Required(word) => {
            Predicate::new(like(columns.primary), vec![contains_pattern(word)])
        }
        Token::Excluded(word) => {
            Predicate::new(not_like(columns.primary), vec![contains_pattern(word)])
        }
        Token::Any(word) => {
            let fragment = columns
                .any
                .iter()
                .map(|column| like(column))
                .collect::<Vec<_>>()
                .join(" OR ");
            let params = columns.any.iter().map(|_| contains_pattern(word)).collect();
            Predicate::new(fragment, params)
        }
    }
}

pub fn not_excluded() -> Predicate {
    Predicate::bare("p.exclude = 0")
}

/// How a [`RangeFilter`] value is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeKind {
    Integer,
    Real,
    /// User enters kilobytes, the column stores bytes.
    Kilobytes,
}

impl RangeKind {
    fn parse(self, raw: &str) -> Option<SqlValue> {
        let raw = raw.trim();
        match self {
            RangeKind::Integer => raw.parse::<i64>().ok().map(SqlValue::Integer),
            RangeKind::Real => raw
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(SqlValue::Real),
            RangeKind::Kilobytes => raw
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|kb| SqlValue::Integer((kb * 1024.0).round() as i64)),
        }
    }
}

/// "column is set" plus "column <=/>= value", or nothing when the value is
/// absent or does not parse.
pub fn range_predicates(column: &str, range: &RangeFilter, kind: RangeKind) -> Vec<Predicate> {
    let Some(value) = range.value.as_deref().and_then(|raw| kind.parse(raw)) else {
        return Vec::new();
    };
    let op = if range.is_max { "<=" } else { ">=" };
    vec![
        Predicate::bare(format!("{column} > 0")),
        Predicate::new(format!("{column} {op} ?"), vec![value]),
    ]
}

/// Equality for a single value, an IN-list for several, nothing for none.
pub fn one_of(column: &str, values: Vec<SqlValue>) -> Option<Predicate> {
    match values.len() {
        0 => None,
        1 => Some(Predicate::new(format!("{column} = ?"), values)),
        n => {
            let placeholders = vec!["?"; n].join(", ");
            Some(Predicate::new(format!("{column} IN ({placeholders})"), values))
        }
    }
}

/// Result of translating a tag selector.
#[derive(Clone, Debug, PartialEq)]
pub enum TagClause {
    None,
    Join(Join),
    Predicate(Predicate),
}

/// `Tag(id)` joins the assignment table, `Untagged` becomes a correlated
/// `NOT EXISTS`.
pub fn tag_clause(
    selector: TagSelector,
    target: TagTarget,
    owner_id_column: &str,
    alias: &str,
) -> TagClause {
    match selector {
        TagSelector::Any => TagClause::None,
        TagSelector::Tag(tag_id) => TagClause::Join(Join {
            clause: format!(
                "INNER JOIN tag_assignment {alias} ON {alias}.target_id = {owner_id_column} \
                 AND {alias}.target_kind = ? AND {alias}.tag_id = ?"
            ),
            params: vec![SqlValue::Integer(target.code()), SqlValue::Integer(tag_id)],
        }),
        TagSelector::Untagged => TagClause::Predicate(Predicate::new(
            format!(
                "NOT EXISTS (SELECT 1 FROM tag_assignment {alias} \
                 WHERE {alias}.target_id = {owner_id_column} AND {alias}.target_kind = ?)"
            ),
            vec![SqlValue::Integer(target.code())],
        )),
    }
}

pub fn preview_predicate(selector: PreviewSelector) -> Option<Predicate> {
    let states: Vec<PreviewState> = match selector {
        PreviewSelector::Any => return None,
        PreviewSelector::Available => vec![PreviewState::Provided, PreviewState::Custom],
        PreviewSelector::Missing => {
            vec![PreviewState::None, PreviewState::Error, PreviewState::Redo]
        }
        PreviewSelector::State(state) => vec![state],
    };
    one_of(
        "f.preview_state",
        states
            .into_iter()
            .map(|state| SqlValue::Integer(state.code()))
            .collect(),
    )
}
