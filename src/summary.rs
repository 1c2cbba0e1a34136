//! Summary view: usage-tier filtering, sorting and pagination.

use crate::scan::UsageIndex;
use crate::types::UsageRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Rows per summary page.
pub const PER_PAGE: usize = 25;

/// Minimum count for [`UsageTier::High`].
pub const HIGH_USAGE_THRESHOLD: u64 = 10;

/// Minimum count for [`UsageTier::Medium`].
pub const MEDIUM_USAGE_THRESHOLD: u64 = 5;

/// Fixed classification of modules by occurrence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageTier {
    High,
    Medium,
    Low,
}

impl UsageTier {
    /// The tier a count falls into. Every count falls into exactly one.
    pub const fn classify(count: u64) -> Self {
        if count >= HIGH_USAGE_THRESHOLD {
            Self::High
        } else if count >= MEDIUM_USAGE_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn matches(self, count: u64) -> bool {
        Self::classify(count) == self
    }

    /// Parse a `usage_filter` value. Empty and unknown values mean no filter.
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub const fn as_param(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "Highly Used (≥10)",
            Self::Medium => "Moderately Used (5-9)",
            Self::Low => "Low Usage (<5)",
        }
    }
}

/// Column the summary is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "module_name")]
    Name,
    #[serde(rename = "usage_count")]
    Count,
}

impl SortKey {
    /// Parse an `orderby` value. Unknown columns fall back to the module name.
    pub fn from_param(value: &str) -> Self {
        match value.trim() {
            "usage_count" | "count" => Self::Count,
            _ => Self::Name,
        }
    }

    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Name => "module_name",
            Self::Count => "usage_count",
        }
    }

    fn compare(self, a: &UsageRecord, b: &UsageRecord) -> Ordering {
        match self {
            Self::Name => a
                .name
                .as_str()
                .to_lowercase()
                .cmp(&b.name.as_str().to_lowercase()),
            Self::Count => a.count.cmp(&b.count),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse an `order` value: only `asc` is ascending, anything else descends.
    pub fn from_param(value: &str) -> Self {
        if value.trim() == "asc" { Self::Asc } else { Self::Desc }
    }

    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Effective parameters of a summary request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryQuery {
    pub tier: Option<UsageTier>,
    pub sort: SortKey,
    pub direction: SortDirection,
    /// 1-based page number
    pub page: usize,
    /// Case-insensitive module-name search
    pub search: Option<String>,
}

impl Default for SummaryQuery {
    fn default() -> Self {
        Self {
            tier: None,
            sort: SortKey::default(),
            direction: SortDirection::default(),
            page: 1,
            search: None,
        }
    }
}

impl SummaryQuery {
    /// Build a query from raw request parameters, applying the lenient defaults
    /// of the admin table.
    pub fn from_params(
        usage_filter: Option<&str>,
        orderby: Option<&str>,
        order: Option<&str>,
        page: Option<usize>,
        search: Option<&str>,
    ) -> Self {
        Self {
            tier: usage_filter.and_then(UsageTier::from_param),
            sort: orderby.map(SortKey::from_param).unwrap_or_default(),
            direction: order.map(SortDirection::from_param).unwrap_or_default(),
            page: page.unwrap_or(1).max(1),
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    fn includes(&self, record: &UsageRecord, needle: Option<&str>) -> bool {
        self.tier.is_none_or(|tier| tier.matches(record.count))
            && needle.is_none_or(|needle| record.name.as_str().to_lowercase().contains(needle))
    }
}

/// One page of the summary table.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryPage<'a> {
    pub items: Vec<&'a UsageRecord>,
    pub total_items: usize,
    pub total_pages: usize,
    pub per_page: usize,
    pub page: usize,
    pub query: SummaryQuery,
}

/// Filter, sort and paginate the records of a scan.
///
/// Sorting is stable: records with equal keys keep registry order. Pages past
/// the end are empty rather than an error.
pub fn build_summary<'a>(index: &'a UsageIndex, query: &SummaryQuery) -> SummaryPage<'a> {
    let needle = query.search.as_deref().map(str::to_lowercase);
    let mut rows: Vec<&UsageRecord> = index
        .records()
        .filter(|record| query.includes(record, needle.as_deref()))
        .collect();

    rows.sort_by(|a, b| {
        let ordering = query.sort.compare(a, b);
        match query.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let total_items = rows.len();
    let page = query.page.max(1);
    let items = rows
        .into_iter()
        .skip((page - 1).saturating_mul(PER_PAGE))
        .take(PER_PAGE)
        .collect();

    SummaryPage {
        items,
        total_items,
        total_pages: total_items.div_ceil(PER_PAGE),
        per_page: PER_PAGE,
        page,
        query: query.clone(),
    }
}
