//! Declarative list filters.
//!
//! Each entity owns a static [`FilterSpec`] naming the fields it can be
//! filtered on, the operators each field accepts, and the columns it may be
//! sorted by. [`parser::parse`] turns raw query pairs into a [`FilterQuery`],
//! which then writes its predicates and ordering into a `sqlx::QueryBuilder`.
//!
//! Query keys follow the `<field>` / `<field>__<op>` convention:
//!
//! | key               | SQL                                  |
//! |-------------------|--------------------------------------|
//! | `year=1994`       | `books.year = $1`                    |
//! | `year__lt=1995`   | `books.year < $1`                    |
//! | `year__gte=1993`  | `books.year >= $1`                   |
//! | `title__ilike=2`  | `books.title ILIKE '%2%'`            |
//! | `order_by=-year`  | `ORDER BY books.year DESC, books.id` |

pub mod parser;
pub mod tables;

use sqlx::{Postgres, QueryBuilder};

pub use parser::parse;
pub use tables::{Filterable, AUTHOR_FILTER, BOOK_FILTER, PUBLISHER_FILTER};

/// Comparison applied by a filter key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    ILike,
    Lt,
    Gte,
}

impl Operator {
    /// Parse the part of a key after `__`
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "ilike" => Some(Operator::ILike),
            "lt" => Some(Operator::Lt),
            "gte" => Some(Operator::Gte),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Operator::Eq => " = ",
            Operator::ILike => " ILIKE ",
            Operator::Lt => " < ",
            Operator::Gte => " >= ",
        }
    }
}

/// Type a filter value is coerced to before binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
}

/// A column that accepts filters
#[derive(Debug)]
pub struct FilterField {
    pub name: &'static str,
    pub kind: ValueKind,
    pub operators: &'static [Operator],
}

/// Per-entity whitelist of filters and sort columns
#[derive(Debug)]
pub struct FilterSpec {
    /// Table (or alias) used to qualify columns
    pub table: &'static str,
    pub fields: &'static [FilterField],
    pub sortable: &'static [&'static str],
    /// Relationship fields that must never be used in `order_by`
    pub unsortable: &'static [&'static str],
}

impl FilterSpec {
    pub fn field(&self, name: &str) -> Option<&'static FilterField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn sortable_column(&self, name: &str) -> Option<&'static str> {
        self.sortable.iter().copied().find(|column| *column == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: &'static str,
    pub operator: Operator,
    pub value: FilterValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: &'static str,
    pub direction: Direction,
}

/// Validated predicates and ordering for one list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    pub table: &'static str,
    pub predicates: Vec<Predicate>,
    pub ordering: Vec<OrderTerm>,
}

impl FilterQuery {
    /// Query with no predicates and default ordering
    pub fn unfiltered(spec: &FilterSpec) -> Self {
        Self {
            table: spec.table,
            predicates: Vec::new(),
            ordering: Vec::new(),
        }
    }

    /// Append the conjunction of all predicates. `has_where` tells whether the
    /// builder already holds a `WHERE` clause.
    pub fn push_predicates(&self, qb: &mut QueryBuilder<'_, Postgres>, has_where: bool) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 && !has_where { " WHERE " } else { " AND " });
            qb.push(self.table)
                .push(".")
                .push(predicate.column)
                .push(predicate.operator.sql());

            match (&predicate.value, predicate.operator) {
                (FilterValue::Text(text), Operator::ILike) => {
                    qb.push_bind(format!("%{}%", escape_like(text)));
                }
                (FilterValue::Text(text), _) => {
                    qb.push_bind(text.clone());
                }
                (FilterValue::Integer(number), _) => {
                    qb.push_bind(*number);
                }
            }
        }
    }

    /// Append `ORDER BY`, always ending with the primary key so pages are stable
    pub fn push_order_by(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" ORDER BY ");
        for term in &self.ordering {
            qb.push(self.table).push(".").push(term.column);
            qb.push(match term.direction {
                Direction::Asc => " ASC, ",
                Direction::Desc => " DESC, ",
            });
        }
        qb.push(self.table).push(".id ASC");
    }
}

/// Escape LIKE wildcards so user input matches literally
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
