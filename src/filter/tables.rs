//! Filter tables for each catalog entity

use super::{FilterField, FilterSpec, Operator, ValueKind};
use crate::models::{Author, Book, Publisher};

const TEXT_SEARCH: &[Operator] = &[Operator::ILike];
const NUMERIC_RANGE: &[Operator] = &[Operator::Eq, Operator::Lt, Operator::Gte];

pub static PUBLISHER_FILTER: FilterSpec = FilterSpec {
    table: "publishers",
    fields: &[FilterField {
        name: "name",
        kind: ValueKind::Text,
        operators: TEXT_SEARCH,
    }],
    sortable: &["id", "name"],
    unsortable: &["books"],
};

pub static AUTHOR_FILTER: FilterSpec = FilterSpec {
    table: "authors",
    fields: &[
        FilterField {
            name: "first_name",
            kind: ValueKind::Text,
            operators: TEXT_SEARCH,
        },
        FilterField {
            name: "last_name",
            kind: ValueKind::Text,
            operators: TEXT_SEARCH,
        },
        FilterField {
            name: "middle_name",
            kind: ValueKind::Text,
            operators: TEXT_SEARCH,
        },
    ],
    sortable: &["id", "first_name", "last_name", "middle_name"],
    unsortable: &["books"],
};

pub static BOOK_FILTER: FilterSpec = FilterSpec {
    table: "books",
    fields: &[
        FilterField {
            name: "title",
            kind: ValueKind::Text,
            operators: TEXT_SEARCH,
        },
        FilterField {
            name: "description",
            kind: ValueKind::Text,
            operators: TEXT_SEARCH,
        },
        FilterField {
            name: "year",
            kind: ValueKind::Integer,
            operators: NUMERIC_RANGE,
        },
        FilterField {
            name: "pages",
            kind: ValueKind::Integer,
            operators: NUMERIC_RANGE,
        },
        FilterField {
            name: "edition",
            kind: ValueKind::Integer,
            operators: NUMERIC_RANGE,
        },
    ],
    sortable: &["id", "title", "year", "pages", "edition", "description", "publisher_id"],
    unsortable: &["authors", "publisher"],
};

/// Entities that can be listed through the generic filter translator
pub trait Filterable {
    fn filter_spec() -> &'static FilterSpec;
}

impl Filterable for Publisher {
    fn filter_spec() -> &'static FilterSpec {
        &PUBLISHER_FILTER
    }
}

impl Filterable for Author {
    fn filter_spec() -> &'static FilterSpec {
        &AUTHOR_FILTER
    }
}

impl Filterable for Book {
    fn filter_spec() -> &'static FilterSpec {
        &BOOK_FILTER
    }
}
