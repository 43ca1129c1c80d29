//! # Pagination Engine
//!
//! Turns a caller's page/sort/search request into a safe ORDER BY fragment,
//! LIMIT/OFFSET bounds, and a page-info summary.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PageRequest { search: "abc", page: -1, pageSize: 20,                  │
//! │                sortBy: "SAMPLE_NAME", sortDirection: "down" }           │
//! │       │                                                                 │
//! │       │  normalize: page -1 → 0, "down" → ASC                           │
//! │       ▼                                                                 │
//! │  resolve_order_clause("sample_id", allow_list, &request)               │
//! │       │  "sample_name" ∈ allow_list?                                    │
//! │       ▼                                                                 │
//! │  "sample_name ASC, sample_id"         (ORDER BY fragment)               │
//! │                                                                         │
//! │  limit_and_offset(20, 0) → Some((20, 0))                               │
//! │                                                                         │
//! │  COUNT(*) = 45 ──► compute_page_info ──► PageInfo {                    │
//! │                        currentPageIndex: 0, maxPageIndex: 2,            │
//! │                        rowsPerPage: 20, totalAvailableItems: 45 }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ORDER BY Safety
//! `sortBy` is caller input that ends up inside SQL text. It is only used
//! when it names a sortable column exactly (case-insensitive); the column
//! name written into the fragment is the allow-list's own spelling, never
//! the caller's string.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Rows per page used when neither the request nor the count provides one.
pub const DEFAULT_ROWS_PER_PAGE: i64 = 10;

// =============================================================================
// Sort Direction
// =============================================================================

/// Normalized sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Coerces a raw direction; anything but exactly `ASC`/`DESC` is `ASC`.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "DESC" => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

// =============================================================================
// Page Request
// =============================================================================

/// Generic page/sort/search request as received from a caller.
///
/// Invalid values are coerced by the accessors, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct PageRequest {
    /// Free-text filter.
    pub search: String,

    /// Zero-based page index.
    pub page: i64,

    /// Requested rows per page; `<= 0` means unbounded.
    pub page_size: i64,

    /// Column to sort by, validated against an allow-list.
    pub sort_by: String,

    /// `ASC` or `DESC`.
    pub sort_direction: String,
}

impl PageRequest {
    /// Request for the first `page_size` rows in default order.
    pub fn first(page_size: i64) -> Self {
        PageRequest {
            page_size,
            ..PageRequest::default()
        }
    }

    /// Page index with negatives floored at 0.
    pub fn page_index(&self) -> i64 {
        self.page.max(0)
    }

    /// Direction coerced to `ASC` unless exactly `DESC`.
    pub fn sort_direction(&self) -> SortDirection {
        SortDirection::coerce(&self.sort_direction)
    }

    /// `%search%` pattern for LIKE filters (`%%` for an empty search).
    pub fn search_pattern(&self) -> String {
        format!("%{}%", self.search)
    }
}

// =============================================================================
// Page Info
// =============================================================================

/// Pagination summary returned with a page of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page_index: i64,
    pub max_page_index: i64,
    pub rows_per_page: i64,
    pub total_available_items: i64,
}

/// How [`compute_page_info`] derives `rowsPerPage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowsPerPage {
    /// The requested page size, or [`DEFAULT_ROWS_PER_PAGE`] when `<= 0`.
    #[default]
    Requested,
    /// The total row count itself, or [`DEFAULT_ROWS_PER_PAGE`] when 0.
    /// Always yields a single page; kept for clients built against it.
    FetchedCount,
}

impl RowsPerPage {
    /// Parses `requested` / `fetched` (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "requested" => Some(RowsPerPage::Requested),
            "fetched" | "fetched_count" => Some(RowsPerPage::FetchedCount),
            _ => None,
        }
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Builds the ORDER BY fragment (without the `ORDER BY` keyword).
///
/// ## Rules
/// - empty `sortBy` → `base_key`
/// - `sortBy` not in `allow_list` → `base_key`
/// - otherwise → `"<column> <DIR>, <base_key>"`
///
/// ## Example
/// ```rust
/// use crudkit_core::pagination::{resolve_order_clause, PageRequest};
///
/// let request = PageRequest {
///     sort_by: "name".to_string(),
///     sort_direction: "DESC".to_string(),
///     ..PageRequest::default()
/// };
/// assert_eq!(resolve_order_clause("id", &["id", "name"], &request), "name DESC, id");
/// ```
pub fn resolve_order_clause(base_key: &str, allow_list: &[&str], request: &PageRequest) -> String {
    let requested = request.sort_by.trim().to_lowercase();
    if requested.is_empty() {
        return base_key.to_string();
    }

    match allow_list
        .iter()
        .find(|column| column.to_lowercase() == requested)
    {
        Some(column) => format!("{} {}, {}", column, request.sort_direction(), base_key),
        None => base_key.to_string(),
    }
}

/// Derives the page-info summary from the total row count.
pub fn compute_page_info(request: &PageRequest, total: i64, policy: RowsPerPage) -> PageInfo {
    let total = total.max(0);
    let rows_per_page = match policy {
        RowsPerPage::Requested if request.page_size > 0 => request.page_size,
        RowsPerPage::FetchedCount if total > 0 => total,
        _ => DEFAULT_ROWS_PER_PAGE,
    };

    // ceil(total / rows) - 1 without the overflowing `total + rows`
    let max_page_index = if total == 0 {
        0
    } else {
        (total - 1) / rows_per_page
    };

    PageInfo {
        current_page_index: request.page_index(),
        max_page_index,
        rows_per_page,
        total_available_items: total,
    }
}

/// LIMIT/OFFSET for a request; `None` means fetch everything.
///
/// Bounded only when `page_size > 0` and `page >= 0`. The offset saturates,
/// so a page past the end of any table reads as empty.
pub fn limit_and_offset(page_size: i64, page: i64) -> Option<(i64, i64)> {
    if page_size > 0 && page >= 0 {
        Some((page_size, page_size.saturating_mul(page)))
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOW: &[&str] = &["id", "type", "name"];

    fn sorted(by: &str, dir: &str) -> PageRequest {
        PageRequest {
            sort_by: by.to_string(),
            sort_direction: dir.to_string(),
            ..PageRequest::default()
        }
    }

    #[test]
    fn test_empty_sort_by_returns_base_key() {
        for dir in ["ASC", "DESC", "sideways", ""] {
            assert_eq!(resolve_order_clause("id", ALLOW, &sorted("", dir)), "id");
        }
    }

    #[test]
    fn test_unknown_sort_by_falls_back() {
        assert_eq!(
            resolve_order_clause("id", ALLOW, &sorted("password", "DESC")),
            "id"
        );
        assert_eq!(
            resolve_order_clause("id", ALLOW, &sorted("name; DROP TABLE t", "ASC")),
            "id"
        );
    }

    #[test]
    fn test_valid_sort_by() {
        assert_eq!(
            resolve_order_clause("id", ALLOW, &sorted("name", "DESC")),
            "name DESC, id"
        );
    }

    #[test]
    fn test_sort_direction_is_coerced() {
        assert_eq!(
            resolve_order_clause("id", ALLOW, &sorted("type", "desc")),
            "type ASC, id"
        );
        assert_eq!(sorted("", "DESC").sort_direction(), SortDirection::Desc);
        assert_eq!(sorted("", "").sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn test_sort_by_is_case_folded_but_allow_list_spelling_is_used() {
        assert_eq!(
            resolve_order_clause("id", ALLOW, &sorted("NAME", "ASC")),
            "name ASC, id"
        );
    }

    #[test]
    fn test_partial_column_names_do_not_match() {
        let allow = &["guid", "name"];
        assert_eq!(resolve_order_clause("guid", allow, &sorted("id", "ASC")), "guid");
        assert_eq!(resolve_order_clause("guid", allow, &sorted("am", "ASC")), "guid");
    }

    #[test]
    fn test_negative_page_is_floored() {
        let request = PageRequest {
            page: -3,
            ..PageRequest::default()
        };
        assert_eq!(request.page_index(), 0);
        assert_eq!(
            compute_page_info(&request, 5, RowsPerPage::Requested).current_page_index,
            0
        );
    }

    #[test]
    fn test_page_info_for_empty_result() {
        for policy in [RowsPerPage::Requested, RowsPerPage::FetchedCount] {
            let info = compute_page_info(&PageRequest::default(), 0, policy);
            assert_eq!(info.rows_per_page, 10);
            assert_eq!(info.max_page_index, 0);
            assert_eq!(info.total_available_items, 0);
        }
    }

    #[test]
    fn test_page_info_max_index() {
        let request = PageRequest {
            page: 1,
            page_size: 10,
            ..PageRequest::default()
        };
        let info = compute_page_info(&request, 25, RowsPerPage::Requested);

        assert_eq!(
            info,
            PageInfo {
                current_page_index: 1,
                max_page_index: 2,
                rows_per_page: 10,
                total_available_items: 25,
            }
        );

        let exact = compute_page_info(&request, 30, RowsPerPage::Requested);
        assert_eq!(exact.max_page_index, 2);
    }

    #[test]
    fn test_fetched_count_policy_yields_single_page() {
        let request = PageRequest::first(10);
        let info = compute_page_info(&request, 25, RowsPerPage::FetchedCount);

        assert_eq!(info.rows_per_page, 25);
        assert_eq!(info.max_page_index, 0);
    }

    #[test]
    fn test_limit_and_offset() {
        assert_eq!(limit_and_offset(20, 0), Some((20, 0)));
        assert_eq!(limit_and_offset(20, 3), Some((20, 60)));
        assert_eq!(limit_and_offset(0, 3), None);
        assert_eq!(limit_and_offset(20, -1), None);
    }

    #[test]
    fn test_huge_page_size_does_not_overflow() {
        let request = PageRequest::first(i64::MAX);
        let info = compute_page_info(&request, 5, RowsPerPage::Requested);

        assert_eq!(info.rows_per_page, i64::MAX);
        assert_eq!(info.max_page_index, 0);

        let full = compute_page_info(&request, i64::MAX, RowsPerPage::Requested);
        assert_eq!(full.max_page_index, 0);

        let fetched = compute_page_info(&request, i64::MAX, RowsPerPage::FetchedCount);
        assert_eq!(fetched.max_page_index, 0);
    }

    #[test]
    fn test_huge_offset_saturates() {
        assert_eq!(
            limit_and_offset(i64::MAX / 2, 3),
            Some((i64::MAX / 2, i64::MAX))
        );
        assert_eq!(
            limit_and_offset(i64::MAX, i64::MAX),
            Some((i64::MAX, i64::MAX))
        );
    }

    #[test]
    fn test_rows_per_page_parse() {
        assert_eq!(RowsPerPage::parse("Requested"), Some(RowsPerPage::Requested));
        assert_eq!(RowsPerPage::parse("fetched"), Some(RowsPerPage::FetchedCount));
        assert_eq!(RowsPerPage::parse("whatever"), None);
    }

    #[test]
    fn test_wire_shapes() {
        let request: PageRequest = serde_json::from_str(
            r#"{"search":"abc","page":2,"pageSize":25,"sortBy":"name","sortDirection":"DESC"}"#,
        )
        .unwrap();
        assert_eq!(request.search, "abc");
        assert_eq!(request.page_size, 25);
        assert_eq!(request.search_pattern(), "%abc%");

        let partial: PageRequest = serde_json::from_str(r#"{"page":1}"#).unwrap();
        assert_eq!(partial.page, 1);
        assert!(partial.sort_by.is_empty());

        let info = PageInfo {
            current_page_index: 0,
            max_page_index: 2,
            rows_per_page: 10,
            total_available_items: 25,
        };
        assert_eq!(
            serde_json::to_value(info).unwrap(),
            serde_json::json!({
                "currentPageIndex": 0,
                "maxPageIndex": 2,
                "rowsPerPage": 10,
                "totalAvailableItems": 25
            })
        );
    }
}
