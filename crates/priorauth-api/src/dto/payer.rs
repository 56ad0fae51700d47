//! Payer directory DTOs

use priorauth_services::PayerQuery;
use serde::Deserialize;

use super::common::deserialize_optional_number;

/// Query parameters for `GET /api/payers`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerSearchParams {
    /// Free-text filter on name and notes
    #[serde(default)]
    pub q: Option<String>,

    /// State code filter
    #[serde(default)]
    pub state: Option<String>,

    /// Plan label filter
    #[serde(default)]
    pub plan: Option<String>,

    /// Page number (1-indexed)
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub page: Option<i64>,

    /// Items per page
    #[serde(default, alias = "page_size", deserialize_with = "deserialize_optional_number")]
    pub page_size: Option<i64>,
}

impl From<PayerSearchParams> for PayerQuery {
    fn from(params: PayerSearchParams) -> Self {
        PayerQuery {
            q: params.q,
            state: params.state,
            plan: params.plan,
            page: params.page,
            page_size: params.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_convert_to_query() {
        let params: PayerSearchParams =
            serde_json::from_str(r#"{"q": "aetna", "pageSize": "5", "page": ""}"#).unwrap();
        let query = PayerQuery::from(params);

        assert_eq!(query.q.as_deref(), Some("aetna"));
        assert_eq!(query.page_size, Some(5));
        assert_eq!(query.page, None);
    }
}
