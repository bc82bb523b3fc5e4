//! Document database flavor lookup (read-only)

use crate::client::OtcClient;
use crate::error::{OtcError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Client-side filters applied to the flavor list
#[derive(Debug, Clone, Default)]
pub struct FlavorFilter {
    /// Node role: "mongos", "shard", "config" or "replica"
    pub r#type: Option<String>,
    pub vcpus: Option<String>,
    pub memory: Option<String>,
}

impl FlavorFilter {
    fn matches(&self, flavor: &DdsFlavor) -> bool {
        if let Some(t) = &self.r#type {
            if *t != flavor.r#type {
                return false;
            }
        }
        if let Some(vcpus) = &self.vcpus {
            if *vcpus != flavor.vcpus {
                return false;
            }
        }
        if let Some(memory) = &self.memory {
            if *memory != flavor.memory {
                return false;
            }
        }
        true
    }
}

impl OtcClient {
    pub async fn list_dds_flavors(&self, engine_name: &str) -> Result<Vec<DdsFlavor>> {
        let url = format!(
            "{}?region={}&engine_name={engine_name}",
            self.dds_url("flavors"),
            self.region()
        );
        let response: ListFlavorsResponse = self.get(&url).await?;
        Ok(response.flavors)
    }

    /// List flavors for an engine and keep those matching the filter.
    ///
    /// An empty result is an error: a flavor lookup feeds instance sizing
    /// and silently matching nothing would surface much later.
    pub async fn find_dds_flavors(
        &self,
        engine_name: &str,
        filter: &FlavorFilter,
    ) -> Result<Vec<DdsFlavor>> {
        let flavors: Vec<DdsFlavor> = self
            .list_dds_flavors(engine_name)
            .await?
            .into_iter()
            .filter(|f| filter.matches(f))
            .collect();

        if flavors.is_empty() {
            return Err(OtcError::NoMatch(format!(
                "no {engine_name} flavors match the given filter"
            )));
        }
        Ok(flavors)
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ListFlavorsResponse {
    #[serde(default)]
    flavors: Vec<DdsFlavor>,
}

/// One offered instance size
#[derive(Debug, Clone, Deserialize)]
pub struct DdsFlavor {
    pub spec_code: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub vcpus: String,
    /// Memory in GB; the wire calls this "ram"
    #[serde(rename = "ram")]
    pub memory: String,
    /// Availability per AZ, e.g. "eu-de-01" -> "normal"
    #[serde(default)]
    pub az_status: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flavors() -> Vec<DdsFlavor> {
        serde_json::from_value::<ListFlavorsResponse>(json!({
            "flavors": [
                {
                    "spec_code": "dds.mongodb.s2.medium.4.repset",
                    "type": "replica",
                    "vcpus": "1",
                    "ram": "4",
                    "az_status": { "eu-de-01": "normal" }
                },
                {
                    "spec_code": "dds.mongodb.s2.large.4.shard",
                    "type": "shard",
                    "vcpus": "2",
                    "ram": "8"
                }
            ]
        }))
        .unwrap()
        .flavors
    }

    #[test]
    fn wire_field_ram_maps_to_memory() {
        let flavors = flavors();
        assert_eq!(flavors[0].memory, "4");
        assert_eq!(
            flavors[0].az_status.get("eu-de-01").map(String::as_str),
            Some("normal")
        );
    }

    #[test]
    fn filter_narrows_by_type_and_size() {
        let filter = FlavorFilter {
            r#type: Some("shard".to_string()),
            vcpus: None,
            memory: Some("8".to_string()),
        };
        let matched: Vec<_> = flavors().into_iter().filter(|f| filter.matches(f)).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].spec_code, "dds.mongodb.s2.large.4.shard");
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = FlavorFilter::default();
        assert!(flavors().iter().all(|f| filter.matches(f)));
    }
}
