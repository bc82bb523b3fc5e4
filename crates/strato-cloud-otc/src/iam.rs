//! Identity group lookup (read-only)
//!
//! Used to resolve a group name into its id before wiring permissions.
//! Groups are not managed here; this is a data source only.

use crate::client::OtcClient;
use crate::error::{OtcError, Result};
use serde::Deserialize;

impl OtcClient {
    /// Look up exactly one group by name, optionally scoped to a domain.
    ///
    /// Zero matches and multiple matches are both errors: a lookup that
    /// feeds ids into other resources must be unambiguous.
    pub async fn find_group(&self, name: &str, domain_id: Option<&str>) -> Result<Group> {
        let mut url = format!("{}?name={name}", self.iam_url("groups"));
        if let Some(domain_id) = domain_id.or(self.domain_id()) {
            url.push_str(&format!("&domain_id={domain_id}"));
        }

        let response: ListGroupsResponse = self.get(&url).await?;
        tracing::debug!("Group query for {name:?} returned {} results", response.groups.len());

        let mut groups = response.groups.into_iter();
        let group = groups
            .next()
            .ok_or_else(|| OtcError::NoMatch(format!("identity group {name:?}")))?;
        if groups.next().is_some() {
            return Err(OtcError::MultipleMatches(format!(
                "identity group {name:?}; narrow the query with a domain id"
            )));
        }
        Ok(group)
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ListGroupsResponse {
    #[serde(default)]
    groups: Vec<Group>,
}

/// An identity group as reported by the API
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub domain_id: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn group_list_deserializes() {
        let response: ListGroupsResponse = serde_json::from_value(json!({
            "groups": [
                { "id": "g-01", "name": "operators", "domain_id": "d-01" }
            ]
        }))
        .unwrap();
        assert_eq!(response.groups[0].name, "operators");
    }

    #[test]
    fn empty_group_list_deserializes() {
        let response: ListGroupsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.groups.is_empty());
    }
}
