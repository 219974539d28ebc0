use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::services::trail_service::TrailError;

/// Raw `?page=&per_page=` query parameters.
///
/// Kept as strings so that non-numeric input is reported with the offending
/// parameter name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// A validated page request. `page` is one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Parse and clamp paging parameters. Both values must be at least 1;
    /// `per_page` is capped at the configured maximum.
    pub fn from_params(params: &PageParams, api: &ApiConfig) -> Result<Self, TrailError> {
        let mut field_errors = HashMap::new();

        let page = parse_positive("page", params.page.as_deref(), 1, &mut field_errors);
        let per_page = parse_positive(
            "per_page",
            params.per_page.as_deref(),
            i64::from(api.default_per_page),
            &mut field_errors,
        );

        match (page, per_page) {
            (Some(page), Some(per_page)) => Ok(Self {
                page,
                per_page: per_page.min(i64::from(api.max_per_page.max(1))),
            }),
            _ => Err(TrailError::Validation {
                message: "Invalid pagination parameters".to_string(),
                field_errors,
            }),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Ceiling division of `total` by the page size.
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total - 1) / self.per_page + 1
    }
}

fn parse_positive(
    name: &str,
    raw: Option<&str>,
    default: i64,
    field_errors: &mut HashMap<String, String>,
) -> Option<i64> {
    let Some(raw) = raw else {
        return Some(default.max(1));
    };
    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 1 => Some(value),
        _ => {
            field_errors.insert(name.to_string(), format!("{} must be an integer greater than or equal to 1", name));
            None
        }
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
    pub trails: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: PageRequest, total: i64, trails: Vec<T>) -> Self {
        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: request.total_pages(total),
            trails,
        }
    }
}
