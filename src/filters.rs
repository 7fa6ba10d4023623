use serde::Serialize;
use time::OffsetDateTime;

use crate::constants::*;
use crate::validator::{Validator, permitted_value};

/// Page and sort parameters for a listing query.
///
/// `sort_safelist` is `'static` so the set of sortable columns is always
/// declared in code, never assembled from request input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Default for Filters {
    fn default() -> Self {
        Filters {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: DEFAULT_SORT.to_string(),
            sort_safelist: EXPENSE_SORT_SAFELIST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

pub fn validate_filters(v: &mut Validator, f: &Filters) {
    v.check(f.page > 0, "page", "must be greater than zero");
    v.check(f.page <= MAX_PAGE, "page", "must be a maximum of 10 million");

    v.check(f.page_size > 0, "page_size", "must be greater than zero");
    v.check(
        f.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );

    v.check(
        permitted_value(f.sort.as_str(), f.sort_safelist),
        "sort",
        "invalid sort value",
    );
}

impl Filters {
    pub fn new(page: i64, page_size: i64, sort: impl Into<String>) -> Self {
        Filters {
            page,
            page_size,
            sort: sort.into(),
            sort_safelist: EXPENSE_SORT_SAFELIST,
        }
    }

    /// Column named by the sort token. The returned name is the safelist's
    /// own entry, so caller text never reaches the ORDER BY clause.
    ///
    /// # Panics
    ///
    /// Panics if the sort token is not in the safelist. Validation rejects
    /// such tokens before a query is built.
    pub fn sort_column(&self) -> &'static str {
        match self
            .sort_safelist
            .iter()
            .copied()
            .find(|safe| *safe == self.sort)
        {
            Some(safe) => safe.trim_start_matches('-'),
            None => panic!("unsafe sort parameter: {}", self.sort),
        }
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Saturates rather than overflowing on unvalidated input.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Scopes a listing to one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthYearFilter {
    pub month: i32,
    pub year: i32,
}

impl MonthYearFilter {
    pub fn new(month: i32, year: i32) -> Self {
        MonthYearFilter { month, year }
    }

    /// The current UTC month.
    pub fn current() -> Self {
        let now = OffsetDateTime::now_utc();
        MonthYearFilter {
            month: i32::from(u8::from(now.month())),
            year: now.year(),
        }
    }

    /// Half-open `[start, end)` bounds as `YYYY-MM-DD` strings.
    pub fn month_range(&self) -> (String, String) {
        let start = format!("{:04}-{:02}-01", self.year, self.month);
        let end = if self.month == 12 {
            format!("{:04}-01-01", self.year + 1)
        } else {
            format!("{:04}-{:02}-01", self.year, self.month + 1)
        };
        (start, end)
    }
}

pub fn validate_month_year_filter(v: &mut Validator, f: &MonthYearFilter) {
    validate_month_year_filter_at(v, f, OffsetDateTime::now_utc().year());
}

pub fn validate_month_year_filter_at(v: &mut Validator, f: &MonthYearFilter, current_year: i32) {
    v.check(f.month > 0, "month", "must be between 1-12 (inclusive)");
    v.check(f.month < 13, "month", "must be between 1-12 (inclusive)");

    v.check(
        f.year >= current_year - YEAR_WINDOW,
        "year",
        "must be within 100 years from today",
    );
    v.check(
        f.year <= current_year + YEAR_WINDOW,
        "year",
        "must be within 100 years from today",
    );
}

/// Pagination summary. Every field is zero (and omitted when serialized)
/// for an empty result.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metadata {
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records == 0 || page_size <= 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_range_within_year() {
        let (start, end) = MonthYearFilter::new(1, 2024).month_range();
        assert_eq!(start, "2024-01-01");
        assert_eq!(end, "2024-02-01");

        let (start, end) = MonthYearFilter::new(9, 2024).month_range();
        assert_eq!(start, "2024-09-01");
        assert_eq!(end, "2024-10-01");
    }

    #[test]
    fn month_range_december_rolls_over() {
        let (start, end) = MonthYearFilter::new(12, 2024).month_range();
        assert_eq!(start, "2024-12-01");
        assert_eq!(end, "2025-01-01");
    }

    #[test]
    fn sort_column_and_direction() {
        let f = Filters::new(1, 10, "-amount");
        assert_eq!(f.sort_column(), "amount");
        assert_eq!(f.sort_direction(), SortDirection::Desc);
        assert_eq!(f.sort_direction().as_sql(), "DESC");

        let f = Filters::new(1, 10, "date");
        assert_eq!(f.sort_column(), "date");
        assert_eq!(f.sort_direction(), SortDirection::Asc);
        assert_eq!(f.sort_direction().as_sql(), "ASC");
    }

    #[test]
    #[should_panic(expected = "unsafe sort parameter")]
    fn sort_column_panics_outside_safelist() {
        Filters::new(1, 10, "amount; DROP TABLE expenses").sort_column();
    }

    #[test]
    fn limit_and_offset() {
        let f = Filters::new(3, 25, "date");
        assert_eq!(f.limit(), 25);
        assert_eq!(f.offset(), 50);
        assert_eq!(Filters::new(1, 25, "date").offset(), 0);
    }

    #[test]
    fn offset_saturates_on_huge_pages() {
        assert_eq!(Filters::new(i64::MAX, 100, "date").offset(), i64::MAX);
        assert_eq!(Filters::new(i64::MIN, 100, "date").offset(), i64::MIN);
    }

    #[test]
    fn filters_validation() {
        let mut v = Validator::new();
        validate_filters(&mut v, &Filters::default());
        assert!(v.is_valid());

        let mut v = Validator::new();
        validate_filters(&mut v, &Filters::new(0, 101, "id"));
        assert_eq!(v.error("page"), Some("must be greater than zero"));
        assert_eq!(v.error("page_size"), Some("must be a maximum of 100"));
        assert_eq!(v.error("sort"), Some("invalid sort value"));

        let mut v = Validator::new();
        validate_filters(&mut v, &Filters::new(10_000_001, 0, "-date"));
        assert_eq!(v.error("page"), Some("must be a maximum of 10 million"));
        assert_eq!(v.error("page_size"), Some("must be greater than zero"));
        assert_eq!(v.error("sort"), None);
    }

    #[test]
    fn month_year_validation() {
        let mut v = Validator::new();
        validate_month_year_filter_at(&mut v, &MonthYearFilter::new(12, 2124), 2024);
        assert!(v.is_valid());

        let mut v = Validator::new();
        validate_month_year_filter_at(&mut v, &MonthYearFilter::new(0, 1923), 2024);
        assert_eq!(v.error("month"), Some("must be between 1-12 (inclusive)"));
        assert_eq!(v.error("year"), Some("must be within 100 years from today"));

        let mut v = Validator::new();
        validate_month_year_filter_at(&mut v, &MonthYearFilter::new(13, 2125), 2024);
        assert!(v.error("month").is_some());
        assert!(v.error("year").is_some());
    }

    #[test]
    fn current_month_is_valid() {
        let mut v = Validator::new();
        validate_month_year_filter(&mut v, &MonthYearFilter::current());
        assert!(v.is_valid());
    }

    #[test]
    fn metadata_empty_result_is_blank() {
        assert_eq!(calculate_metadata(0, 4, 50), Metadata::default());
        let json = serde_json::to_string(&calculate_metadata(0, 4, 50)).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn metadata_last_page_rounds_up() {
        let m = calculate_metadata(101, 2, 50);
        assert_eq!(m.current_page, 2);
        assert_eq!(m.page_size, 50);
        assert_eq!(m.first_page, 1);
        assert_eq!(m.last_page, 3);
        assert_eq!(m.total_records, 101);

        assert_eq!(calculate_metadata(100, 1, 50).last_page, 2);
        assert_eq!(calculate_metadata(1, 1, 100).last_page, 1);
    }
}
