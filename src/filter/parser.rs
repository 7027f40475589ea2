//! Turns raw query pairs into a validated [`FilterQuery`]

use super::{
    Direction, FilterQuery, FilterSpec, FilterValue, Operator, OrderTerm, Predicate, ValueKind,
};
use crate::error::ErrorDetail;

const ORDER_BY: &str = "order_by";

/// Parse every recognised filter key and `order_by` term.
///
/// Unknown keys are skipped. Values that fail type coercion, unknown sort
/// fields and relationship sort fields are all reported together.
pub fn parse(
    spec: &'static FilterSpec,
    pairs: &[(String, String)],
) -> Result<FilterQuery, Vec<ErrorDetail>> {
    let mut query = FilterQuery::unfiltered(spec);
    let mut errors = Vec::new();
    let mut banned = Vec::new();

    for (key, value) in pairs {
        if key == ORDER_BY {
            for term in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                let (direction, name) = split_direction(term);
                if spec.unsortable.iter().any(|field| *field == name) {
                    if !banned.contains(&name) {
                        banned.push(name);
                    }
                } else if let Some(column) = spec.sortable_column(name) {
                    query.ordering.push(OrderTerm { column, direction });
                } else {
                    errors.push(ErrorDetail::at(
                        &["query", ORDER_BY],
                        format!("Unknown sort field: {}.", name),
                        "value_error",
                    ));
                }
            }
            continue;
        }

        let (name, operator) = match key.split_once("__") {
            Some((name, suffix)) => match Operator::from_suffix(suffix) {
                Some(operator) => (name, operator),
                None => continue,
            },
            None => (key.as_str(), Operator::Eq),
        };

        let Some(field) = spec.field(name) else {
            continue;
        };
        if !field.operators.contains(&operator) {
            continue;
        }

        let value = match field.kind {
            ValueKind::Text => FilterValue::Text(value.clone()),
            ValueKind::Integer => match value.trim().parse::<i32>() {
                Ok(number) => FilterValue::Integer(number),
                Err(_) => {
                    errors.push(ErrorDetail::at(
                        &["query", key.as_str()],
                        "Value is not a valid integer.",
                        "type_error.integer",
                    ));
                    continue;
                }
            },
        };

        query.predicates.push(Predicate {
            column: field.name,
            operator,
            value,
        });
    }

    if !banned.is_empty() {
        errors.push(ErrorDetail::at(
            &["query", ORDER_BY],
            format!("You can't sort by: {}.", banned.join(", ")),
            "value_error",
        ));
    }

    if errors.is_empty() {
        Ok(query)
    } else {
        Err(errors)
    }
}

fn split_direction(term: &str) -> (Direction, &str) {
    if let Some(name) = term.strip_prefix('-') {
        (Direction::Desc, name)
    } else if let Some(name) = term.strip_prefix('+') {
        (Direction::Asc, name)
    } else {
        (Direction::Asc, term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AUTHOR_FILTER, BOOK_FILTER, PUBLISHER_FILTER};

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_book_range_filters() {
        let query = parse(
            &BOOK_FILTER,
            &pairs(&[("year__gte", "1993"), ("pages__lt", "300")]),
        )
        .unwrap();
        assert_eq!(
            query.predicates,
            vec![
                Predicate {
                    column: "year",
                    operator: Operator::Gte,
                    value: FilterValue::Integer(1993),
                },
                Predicate {
                    column: "pages",
                    operator: Operator::Lt,
                    value: FilterValue::Integer(300),
                },
            ]
        );
    }

    #[test]
    fn test_equality_on_numeric_field() {
        let query = parse(&BOOK_FILTER, &pairs(&[("edition", "2")])).unwrap();
        assert_eq!(query.predicates[0].operator, Operator::Eq);
        assert_eq!(query.predicates[0].value, FilterValue::Integer(2));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let query = parse(
            &AUTHOR_FILTER,
            &pairs(&[
                ("page", "2"),
                ("first_name", "Уильям"),
                ("books__ilike", "x"),
                ("last_name__lt", "z"),
            ]),
        )
        .unwrap();
        assert!(query.predicates.is_empty());
        assert!(query.ordering.is_empty());
    }

    #[test]
    fn test_invalid_integer_is_reported_with_location() {
        let errors = parse(
            &BOOK_FILTER,
            &pairs(&[("year__lt", "nineteen"), ("pages", "1.5")]),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].loc, Some(vec!["query".to_string(), "year__lt".to_string()]));
        assert_eq!(errors[0].msg, "Value is not a valid integer.");
        assert_eq!(errors[0].kind, "type_error.integer");
        assert_eq!(errors[1].loc, Some(vec!["query".to_string(), "pages".to_string()]));
    }

    #[test]
    fn test_order_by_repeated_and_comma_joined() {
        let query = parse(
            &BOOK_FILTER,
            &pairs(&[("order_by", "-year,title"), ("order_by", "+pages")]),
        )
        .unwrap();
        assert_eq!(
            query.ordering,
            vec![
                OrderTerm {
                    column: "year",
                    direction: Direction::Desc,
                },
                OrderTerm {
                    column: "title",
                    direction: Direction::Asc,
                },
                OrderTerm {
                    column: "pages",
                    direction: Direction::Asc,
                },
            ]
        );
    }

    #[test]
    fn test_relationship_sort_rejected() {
        let errors =
            parse(&AUTHOR_FILTER, &pairs(&[("order_by", "last_name,-books")])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].msg, "You can't sort by: books.");
        assert_eq!(errors[0].loc, Some(vec!["query".to_string(), "order_by".to_string()]));

        let errors = parse(&PUBLISHER_FILTER, &pairs(&[("order_by", "books")])).unwrap_err();
        assert_eq!(errors[0].msg, "You can't sort by: books.");

        let errors =
            parse(&BOOK_FILTER, &pairs(&[("order_by", "authors,+publisher")])).unwrap_err();
        assert_eq!(errors[0].msg, "You can't sort by: authors, publisher.");
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        let errors = parse(&PUBLISHER_FILTER, &pairs(&[("order_by", "founded")])).unwrap_err();
        assert_eq!(errors[0].msg, "Unknown sort field: founded.");
    }

    #[test]
    fn test_errors_are_collected() {
        let errors = parse(
            &BOOK_FILTER,
            &pairs(&[("order_by", "authors"), ("year", "x")]),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_empty_order_by_is_ignored() {
        let query = parse(&PUBLISHER_FILTER, &pairs(&[("order_by", "")])).unwrap();
        assert!(query.ordering.is_empty());
    }
}
