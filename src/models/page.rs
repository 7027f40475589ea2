//! Page request and paginated response

use serde::Serialize;
use utoipa::ToSchema;

use super::{author::AuthorWithBooks, book::BookDetails, publisher::PublisherWithBooks};
use crate::{config::PaginationConfig, error::ErrorDetail};

/// 1-based page request, validated against the pagination settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub size: i64,
}

impl PageParams {
    /// Read `page` and `size` from raw query pairs. The last occurrence wins.
    pub fn parse(
        pairs: &[(String, String)],
        config: &PaginationConfig,
    ) -> Result<Self, Vec<ErrorDetail>> {
        let mut errors = Vec::new();
        let mut params = PageParams {
            page: 1,
            size: config.default_size,
        };

        for (key, value) in pairs {
            match key.as_str() {
                "page" => {
                    if let Some(page) = parse_bounded(key, value, None, &mut errors) {
                        params.page = page;
                    }
                }
                "size" => {
                    let max = Some(config.max_size);
                    if let Some(size) = parse_bounded(key, value, max, &mut errors) {
                        params.size = size;
                    }
                }
                _ => {}
            }
        }

        // The row offset must fit in a BIGINT
        let max_page = i64::MAX / params.size.max(1) + 1;
        if errors.is_empty() && params.page > max_page {
            errors.push(ErrorDetail::at(
                &["query", "page"],
                format!("Ensure this value is less than or equal to {}.", max_page),
                "value_error.number.not_le",
            ));
        }

        if errors.is_empty() {
            Ok(params)
        } else {
            Err(errors)
        }
    }

    /// Rows skipped before this page. `parse` guarantees it does not overflow.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }
}

fn parse_bounded(
    key: &str,
    value: &str,
    max: Option<i64>,
    errors: &mut Vec<ErrorDetail>,
) -> Option<i64> {
    let Ok(number) = value.trim().parse::<i64>() else {
        errors.push(ErrorDetail::at(
            &["query", key],
            "Value is not a valid integer.",
            "type_error.integer",
        ));
        return None;
    };

    if number < 1 {
        errors.push(ErrorDetail::at(
            &["query", key],
            "Ensure this value is greater than or equal to 1.",
            "value_error.number.not_ge",
        ));
        return None;
    }

    if let Some(max) = max {
        if number > max {
            errors.push(ErrorDetail::at(
                &["query", key],
                format!("Ensure this value is less than or equal to {}.", max),
                "value_error.number.not_le",
            ));
            return None;
        }
    }

    Some(number)
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    PublisherPage = Page<PublisherWithBooks>,
    AuthorPage = Page<AuthorWithBooks>,
    BookPage = Page<BookDetails>
)]
pub struct Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Entries of the requested page
    pub items: Vec<T>,
    /// Number of entries matching the filter
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Entries per page
    pub size: i64,
    /// Number of pages
    pub pages: i64,
}

impl<T> Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, total: i64, params: PageParams) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + params.size - 1) / params.size
        };
        Self {
            items,
            total,
            page: params.page,
            size: params.size,
            pages,
        }
    }
}
