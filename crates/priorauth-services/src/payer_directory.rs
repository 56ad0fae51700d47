//! Payer directory
//!
//! Read-only catalog of payers and their authorization rules, with
//! filtered and paginated search. The catalog is loaded once at start-up
//! and never mutated.

use priorauth_core::{
    models::Payer,
    traits::{Page, Pagination},
    AppError, AppResult,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Catalog shipped with the service
const BUILTIN_CATALOG: &str = include_str!("../catalog/payers.json");

/// Directory search filters
///
/// Empty strings behave like absent filters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerQuery {
    /// Case-insensitive substring of name or notes
    pub q: Option<String>,
    /// Exact state code, case-insensitive
    pub state: Option<String>,
    /// Exact plan label, case-insensitive
    pub plan: Option<String>,
    /// 1-based page number
    pub page: Option<i64>,
    /// Page size, clamped to 1..=50
    pub page_size: Option<i64>,
}

impl PayerQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination::new(
            self.page.unwrap_or(defaults.page as i64),
            self.page_size.unwrap_or(defaults.page_size as i64),
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// In-memory payer catalog
#[derive(Debug, Clone)]
pub struct PayerDirectory {
    payers: Vec<Payer>,
}

impl PayerDirectory {
    /// Build a directory, rejecting duplicate ids
    pub fn new(payers: Vec<Payer>) -> AppResult<Self> {
        let mut seen = HashSet::with_capacity(payers.len());
        for payer in &payers {
            if !seen.insert(payer.id.as_str()) {
                return Err(AppError::Config(format!(
                    "Duplicate payer id in catalog: {}",
                    payer.id
                )));
            }
        }

        Ok(Self { payers })
    }

    /// The catalog shipped with the service
    pub fn builtin() -> AppResult<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse a JSON array of payers
    pub fn from_json(json: &str) -> AppResult<Self> {
        let payers: Vec<Payer> = serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("Invalid payer catalog: {}", e)))?;
        Self::new(payers)
    }

    /// Load a JSON catalog from disk
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Cannot read payer catalog {}: {}",
                path.display(),
                e
            ))
        })?;

        let directory = Self::from_json(&json)?;
        info!(
            "Loaded {} payers from {}",
            directory.len(),
            path.display()
        );
        Ok(directory)
    }

    /// Number of payers in the catalog
    pub fn len(&self) -> usize {
        self.payers.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.payers.is_empty()
    }

    /// All payers, in catalog order
    pub fn all(&self) -> &[Payer] {
        &self.payers
    }

    /// Find a payer by exact id
    pub fn get(&self, id: &str) -> Option<&Payer> {
        self.payers.iter().find(|p| p.id == id)
    }

    /// Find a payer by id or fail with `PayerNotFound`
    pub fn require(&self, id: &str) -> AppResult<&Payer> {
        self.get(id)
            .ok_or_else(|| AppError::PayerNotFound(id.to_string()))
    }

    /// Filter (AND-combined) then paginate
    ///
    /// `total` is the filtered count before pagination.
    #[instrument(skip(self))]
    pub fn search(&self, query: &PayerQuery) -> Page<Payer> {
        let needle = non_blank(query.q.as_deref()).map(str::to_lowercase);
        let state = non_blank(query.state.as_deref());
        let plan = non_blank(query.plan.as_deref());

        let matches: Vec<Payer> = self
            .payers
            .iter()
            .filter(|p| needle.as_deref().map_or(true, |n| p.matches_text(n)))
            .filter(|p| state.map_or(true, |s| p.serves_state(s)))
            .filter(|p| plan.map_or(true, |pl| p.offers_plan(pl)))
            .cloned()
            .collect();

        let page = query.pagination().paginate(matches);
        debug!(
            total = page.total,
            returned = page.items.len(),
            "Payer search complete"
        );
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> PayerDirectory {
        PayerDirectory::builtin().unwrap()
    }

    fn ids(page: &Page<Payer>) -> Vec<&str> {
        page.items.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let dir = directory();
        assert_eq!(dir.len(), 4);
        assert!(dir.get("bcbs-tx").is_some_and(|p| p.auth_required));
        assert!(dir.get("medicare-tx").is_some_and(|p| !p.auth_required));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let page = directory().search(&PayerQuery::default());
        assert_eq!(page.total, 4);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.items.len(), 4);
    }

    #[test]
    fn test_text_query_matches_name_and_notes() {
        let dir = directory();

        let page = dir.search(&PayerQuery {
            q: Some("AETNA".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["aetna-nat"]);

        let page = dir.search(&PayerQuery {
            q: Some("imaging".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["uhc-south"]); // only in notes
    }

    #[test]
    fn test_filters_combine_with_and() {
        let page = directory().search(&PayerQuery {
            state: Some("ok".to_string()),
            plan: Some("hmo".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["uhc-south"]);
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_state_filter_is_exact_membership() {
        let page = directory().search(&PayerQuery {
            state: Some("T".to_string()),
            ..Default::default()
        });
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let page = directory().search(&PayerQuery {
            q: Some("   ".to_string()),
            state: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(page.total, 4);
    }

    #[test]
    fn test_pagination_applied_after_filtering() {
        let page = directory().search(&PayerQuery {
            state: Some("TX".to_string()),
            page: Some(2),
            page_size: Some(3),
            ..Default::default()
        });
        assert_eq!(page.total, 4);
        assert_eq!(ids(&page), vec!["uhc-south"]);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let dir = directory();

        let page = dir.search(&PayerQuery {
            page_size: Some(500),
            ..Default::default()
        });
        assert_eq!(page.page_size, 50);

        let page = dir.search(&PayerQuery {
            page_size: Some(0),
            ..Default::default()
        });
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 4);
    }

    #[test]
    fn test_results_are_subset_of_catalog() {
        let dir = directory();
        for state in ["TX", "OK", "AR", "NM", "CA"] {
            for plan in ["", "PPO", "HMO", "Original"] {
                let page = dir.search(&PayerQuery {
                    state: Some(state.to_string()),
                    plan: Some(plan.to_string()),
                    page_size: Some(50),
                    ..Default::default()
                });
                assert_eq!(page.items.len(), page.total);
                assert!(page.items.iter().all(|p| dir.all().contains(p)));
            }
        }
    }

    #[test]
    fn test_require_unknown_payer() {
        let dir = directory();
        let result = dir.require("nobody");
        assert!(matches!(result, Err(AppError::PayerNotFound(id)) if id == "nobody"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[
            {"id": "a", "name": "A", "auth_required": true},
            {"id": "a", "name": "A again", "auth_required": false}
        ]"#;
        assert!(matches!(
            PayerDirectory::from_json(json),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_missing_catalog_file() {
        let result = PayerDirectory::from_json_file("/nonexistent/payers.json");
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
