//! API handlers and shared utilities.
//!
//! This module organizes the service's route handlers and provides common
//! helpers for client-IP extraction, input sanitizing, pagination, and
//! database error classification.

pub mod auth;
pub mod celebrities;
pub mod health;
pub mod participants;
pub mod rate_limit;
pub mod vote;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Extract a client IP for rate limiting from common proxy headers.
pub(crate) fn extract_client_ip(headers: &axum::http::HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Client IP for rate limiting and fingerprint salting. Requests with no
/// usable address all share the "unknown" bucket.
pub(crate) fn client_ip_or_unknown(headers: &axum::http::HeaderMap) -> String {
    extract_client_ip(headers).unwrap_or_else(|| "unknown".to_string())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Strip HTML tags and trim. Registration inputs are rendered verbatim in
/// the admin dashboard.
pub(crate) fn strip_tags(value: &str) -> String {
    match Regex::new(r"<[^>]*>") {
        Ok(re) => re.replace_all(value, "").trim().to_string(),
        Err(_) => value.trim().to_string(),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<u32>,
    /// Page size, capped at 100
    pub limit: Option<u32>,
    /// Optional name filter
    pub search: Option<String>,
}

pub(crate) struct PageWindow {
    pub page: u32,
    pub limit: u32,
    pub offset: i64,
    pub search: Option<String>,
}

impl PageQuery {
    const DEFAULT_LIMIT: u32 = 20;
    const MAX_LIMIT: u32 = 100;

    pub(crate) fn window(&self) -> PageWindow {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);
        let offset = i64::from(page - 1) * i64::from(limit);
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        PageWindow {
            page,
            limit,
            offset,
            search,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub(crate) fn new(window: &PageWindow, total: i64) -> Self {
        let limit = i64::from(window.limit);
        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            page: window.page,
            limit: window.limit,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[test]
    fn extract_client_ip_prefers_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 5.6.7.8"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(extract_client_ip(&headers), Some("1.2.3.4".to_string()));
    }

    #[test]
    fn extract_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(extract_client_ip(&headers), Some("9.9.9.9".to_string()));
    }

    #[test]
    fn extract_client_ip_none_when_missing() {
        let headers = HeaderMap::new();
        assert_eq!(extract_client_ip(&headers), None);
        assert_eq!(client_ip_or_unknown(&headers), "unknown");
    }

    #[test]
    fn strip_tags_removes_markup_and_trims() {
        assert_eq!(strip_tags("  <b>Ali</b> Hassan "), "Ali Hassan");
        assert_eq!(strip_tags("<script>alert(1)</script>"), "alert(1)");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn page_window_defaults_and_clamps() {
        let query = PageQuery {
            page: None,
            limit: None,
            search: None,
        };
        let window = query.window();
        assert_eq!(window.page, 1);
        assert_eq!(window.limit, 20);
        assert_eq!(window.offset, 0);
        assert!(window.search.is_none());

        let query = PageQuery {
            page: Some(3),
            limit: Some(500),
            search: Some("  ".to_string()),
        };
        let window = query.window();
        assert_eq!(window.limit, 100);
        assert_eq!(window.offset, 200);
        assert!(window.search.is_none());

        let query = PageQuery {
            page: Some(0),
            limit: Some(0),
            search: Some(" ali ".to_string()),
        };
        let window = query.window();
        assert_eq!(window.page, 1);
        assert_eq!(window.limit, 1);
        assert_eq!(window.search.as_deref(), Some("ali"));
    }

    #[test]
    fn pagination_rounds_up() {
        let query = PageQuery {
            page: Some(2),
            limit: Some(20),
            search: None,
        };
        let window = query.window();
        let pagination = Pagination::new(&window, 41);
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(pagination.total, 41);
        assert_eq!(pagination.page, 2);

        let empty = Pagination::new(&window, 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
