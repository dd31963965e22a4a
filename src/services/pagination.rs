//! Shared search-and-paginate machinery for list endpoints.
//!
//! Every listing in the API goes through the same three steps: an optional
//! case-insensitive substring filter over one or more text columns, a count
//! of the filtered set, and a 1-indexed page window over it in stable
//! creation order.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, Select,
};
use serde::Serialize;

use crate::errors::{messages, ServiceError};

/// A validated 1-indexed pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_no: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Resolves raw query parameters against the configured defaults.
    ///
    /// Missing values fall back to `pageNo = 1` and the listing's default
    /// page size; explicit zeros are rejected rather than silently clamped,
    /// and oversized page sizes are capped at `max_per_page`.
    pub fn resolve(
        page_no: Option<u64>,
        per_page: Option<u64>,
        default_per_page: u64,
        max_per_page: u64,
    ) -> Result<Self, ServiceError> {
        let page_no = page_no.unwrap_or(1);
        if page_no == 0 {
            return Err(ServiceError::validation("pageNo", messages::PAGE_NO_INVALID));
        }

        let per_page = per_page.unwrap_or(default_per_page);
        if per_page == 0 {
            return Err(ServiceError::validation(
                "perPage",
                messages::PER_PAGE_INVALID,
            ));
        }

        Ok(Self {
            page_no,
            per_page: per_page.min(max_per_page),
        })
    }
}

/// One window of a filtered result set, together with the pre-window total.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Builds a case-insensitive substring condition over the given text
/// columns. A blank term means "no filter" and yields `None`.
pub fn contains_ci<C>(columns: &[C], term: &str) -> Option<Condition>
where
    C: ColumnTrait,
{
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    let pattern = format!("%{}%", term.to_lowercase());
    let mut condition = Condition::any();
    for column in columns {
        condition = condition.add(Expr::expr(Func::lower(Expr::col(*column))).like(pattern.as_str()));
    }
    Some(condition)
}

/// Fetches the requested window of `query` plus the total count of the
/// filtered set. The caller is responsible for applying a stable order.
pub async fn paginate<C, E>(
    db: &C,
    query: Select<E>,
    page: PageRequest,
) -> Result<Page<E::Model>, ServiceError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let paginator = query.paginate(db, page.per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.page_no - 1).await?;

    Ok(Page { items, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::city;
    use sea_orm::{DbBackend, QueryFilter, QueryTrait};

    #[test]
    fn resolve_applies_defaults() {
        let page = PageRequest::resolve(None, None, 20, 100).unwrap();
        assert_eq!(page.page_no, 1);
        assert_eq!(page.per_page, 20);
    }

    #[test]
    fn resolve_rejects_zero_page_number() {
        let err = PageRequest::resolve(Some(0), Some(10), 20, 100).unwrap_err();
        assert_eq!(err.field(), Some("pageNo"));
    }

    #[test]
    fn resolve_rejects_zero_page_size() {
        let err = PageRequest::resolve(Some(1), Some(0), 20, 100).unwrap_err();
        assert_eq!(err.field(), Some("perPage"));
    }

    #[test]
    fn resolve_caps_oversized_page_size() {
        let page = PageRequest::resolve(Some(1), Some(5000), 20, 100).unwrap();
        assert_eq!(page.per_page, 100);
    }

    #[test]
    fn blank_search_terms_mean_no_filter() {
        assert!(contains_ci(&[city::Column::Name], "").is_none());
        assert!(contains_ci(&[city::Column::Name], "   ").is_none());
    }

    #[test]
    fn search_condition_lowercases_both_sides() {
        let condition = contains_ci(&[city::Column::Name], "SPR").unwrap();
        let sql = city::Entity::find()
            .filter(condition)
            .build(DbBackend::Sqlite)
            .to_string();

        assert!(sql.contains("LOWER("), "expected LOWER() in: {}", sql);
        assert!(sql.contains("%spr%"), "expected lowercased pattern in: {}", sql);
    }
}
