//! List query contract
//!
//! Turns raw, possibly repeated `key=value` query pairs into a [`ListQuery`]:
//! pagination with defaults and clamping, a free-text search term, and an
//! allow-listed filter map. Pure; knows nothing about HTTP or the service.

use std::collections::BTreeMap;

/// Filter key → values in the order they were supplied.
pub type Filters = BTreeMap<String, Vec<String>>;

pub const LIMIT_PARAM: &str = "limit";
pub const OFFSET_PARAM: &str = "offset";
pub const SEARCH_PARAM: &str = "search";

/// Rules applied by [`ListQuery::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQueryConfig {
    pub default_limit: u64,
    pub max_limit: u64,
    /// Filter keys kept in [`ListQuery::filters`]; anything else is ignored.
    pub allowed_filters: Vec<String>,
    /// Filter keys that must carry at least one non-empty value.
    pub required: Vec<String>,
}

impl ListQueryConfig {
    pub fn new(default_limit: u64, max_limit: u64) -> Self {
        Self {
            default_limit,
            max_limit,
            allowed_filters: Vec::new(),
            required: Vec::new(),
        }
    }

    pub fn allow(mut self, keys: &[&str]) -> Self {
        self.allowed_filters
            .extend(keys.iter().map(|k| (*k).to_string()));
        self
    }

    /// Mark keys as required. Required keys are implicitly allowed.
    pub fn require(mut self, keys: &[&str]) -> Self {
        for key in keys {
            if !self.allowed_filters.iter().any(|k| k == key) {
                self.allowed_filters.push((*key).to_string());
            }
            self.required.push((*key).to_string());
        }
        self
    }
}

impl Default for ListQueryConfig {
    fn default() -> Self {
        Self::new(50, 200)
    }
}

/// Validated, transport-agnostic list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: u64,
    pub offset: u64,
    /// Free-text term exactly as supplied; empty when absent.
    pub search: String,
    filters: Filters,
    missing: Vec<String>,
}

impl ListQuery {
    /// Parse raw pairs against `config`.
    ///
    /// - `limit`: default when absent, unparsable or `<= 0`; clamped to the max.
    /// - `offset`: `0` when absent or unparsable; negatives are floored to `0`.
    /// - `search`: first value, unmodified.
    /// - filters: allow-listed keys only, all values kept in order.
    pub fn parse<I, K, V>(pairs: I, config: &ListQueryConfig) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut limit_raw: Option<String> = None;
        let mut offset_raw: Option<String> = None;
        let mut search: Option<String> = None;
        let mut filters = Filters::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                LIMIT_PARAM => {
                    limit_raw.get_or_insert_with(|| value.to_string());
                }
                OFFSET_PARAM => {
                    offset_raw.get_or_insert_with(|| value.to_string());
                }
                SEARCH_PARAM => {
                    search.get_or_insert_with(|| value.to_string());
                }
                _ if config.allowed_filters.iter().any(|k| k == key) => {
                    filters
                        .entry(key.to_string())
                        .or_default()
                        .push(value.to_string());
                }
                _ => {}
            }
        }

        let limit = match limit_raw.as_deref().map(|v| v.trim().parse::<i64>()) {
            Some(Ok(n)) if n > 0 => (n as u64).min(config.max_limit),
            _ => config.default_limit.min(config.max_limit),
        };

        let offset = match offset_raw.as_deref().map(|v| v.trim().parse::<i64>()) {
            Some(Ok(n)) if n > 0 => n as u64,
            _ => 0,
        };

        let missing = config
            .required
            .iter()
            .filter(|key| {
                !filters
                    .get(key.as_str())
                    .is_some_and(|values| values.iter().any(|v| !v.trim().is_empty()))
            })
            .cloned()
            .collect();

        Self {
            limit,
            offset,
            search: search.unwrap_or_default(),
            filters,
            missing,
        }
    }

    /// Required filter keys that were absent or blank, in configured order.
    pub fn missing_required(&self) -> &[String] {
        &self.missing
    }

    /// First non-blank value supplied for `key`, trimmed.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.filters
            .get(key)?
            .iter()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Search term, or `None` when it is blank.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ListQueryConfig {
        ListQueryConfig::new(50, 200).require(&["org_id", "namespace"])
    }

    fn parse(qs: &str) -> ListQuery {
        let pairs = qs
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|p| p.split_once('=').unwrap_or((p, "")));
        ListQuery::parse(pairs, &config())
    }

    #[test]
    fn limit_defaults_when_absent() {
        let q = parse("org_id=o&namespace=n");
        assert_eq!(q.limit, 50);
        assert_eq!(q.offset, 0);
    }

    #[test]
    fn limit_defaults_when_invalid_or_non_positive() {
        assert_eq!(parse("limit=abc").limit, 50);
        assert_eq!(parse("limit=0").limit, 50);
        assert_eq!(parse("limit=-7").limit, 50);
    }

    #[test]
    fn limit_is_clamped_to_max() {
        assert_eq!(parse("limit=1000").limit, 200);
        assert_eq!(parse("limit=200").limit, 200);
        assert_eq!(parse("limit=25").limit, 25);
    }

    #[test]
    fn negative_offset_is_floored_to_zero() {
        assert_eq!(parse("offset=-5").offset, 0);
        assert_eq!(parse("offset=oops").offset, 0);
        assert_eq!(parse("offset=40").offset, 40);
    }

    #[test]
    fn first_limit_wins_when_repeated() {
        assert_eq!(parse("limit=10&limit=20").limit, 10);
    }

    #[test]
    fn missing_required_reports_absent_keys_in_order() {
        let q = parse("namespace=default");
        assert_eq!(q.missing_required(), ["org_id".to_string()]);

        let q = parse("");
        assert_eq!(
            q.missing_required(),
            ["org_id".to_string(), "namespace".to_string()]
        );
    }

    #[test]
    fn blank_required_value_counts_as_missing() {
        let q = parse("org_id=&namespace=default");
        assert_eq!(q.missing_required(), ["org_id".to_string()]);

        let q = parse("org_id=&org_id=org-1&namespace=default");
        assert!(q.missing_required().is_empty());
        assert_eq!(q.first("org_id"), Some("org-1"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let q = parse("org_id=o&namespace=n&color=red");
        assert!(q.missing_required().is_empty());
        assert!(!q.filters().contains_key("color"));
        assert_eq!(q.filters().len(), 2);
    }

    #[test]
    fn repeated_filter_values_keep_order() {
        let q = parse("org_id=a&org_id=b&namespace=n");
        assert_eq!(
            q.filters().get("org_id"),
            Some(&vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(q.first("org_id"), Some("a"));
    }

    #[test]
    fn search_is_passed_through() {
        let q = parse("search=%20wid");
        assert_eq!(q.search, "%20wid");
        assert_eq!(parse("search=").search_term(), None);
        assert_eq!(parse("").search, "");
    }

    #[test]
    fn required_keys_are_implicitly_allowed() {
        let cfg = ListQueryConfig::new(10, 20).require(&["org_id"]);
        assert_eq!(cfg.allowed_filters, vec!["org_id".to_string()]);
    }
}
