//! RDS parameter groups

use crate::client::OtcClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Flat configuration for a database parameter group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterGroupConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Parameter overrides as name -> value
    #[serde(default)]
    pub values: HashMap<String, String>,
    pub datastore_type: String,
    pub datastore_version: String,
}

/// Fields changed by an update; unset fields keep their current value
#[derive(Debug, Clone, Default)]
pub struct ParameterGroupUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub values: Option<HashMap<String, String>>,
}

impl OtcClient {
    pub async fn create_parameter_group(
        &self,
        config: &ParameterGroupConfig,
    ) -> Result<ParameterGroup> {
        let url = self.rds_url("configurations");
        tracing::info!("Creating parameter group {}", config.name);
        let response: ParameterGroupResponse = self
            .post(
                &url,
                &ParameterGroupRequest {
                    name: Some(config.name.clone()),
                    description: config.description.clone(),
                    values: Some(config.values.clone()),
                    datastore: Some(DatastoreBody {
                        r#type: config.datastore_type.clone(),
                        version: config.datastore_version.clone(),
                    }),
                },
            )
            .await?;
        Ok(response.configuration)
    }

    pub async fn get_parameter_group(&self, id: &str) -> Result<ParameterGroup> {
        let url = self.rds_url(&format!("configurations/{id}"));
        let response: ParameterGroupResponse = self.get(&url).await?;
        Ok(response.configuration)
    }

    pub async fn list_parameter_groups(&self) -> Result<Vec<ParameterGroup>> {
        let url = self.rds_url("configurations");
        let response: ListParameterGroupsResponse = self.get(&url).await?;
        Ok(response.configurations)
    }

    /// Send only the fields that changed; the datastore cannot be updated.
    pub async fn update_parameter_group(
        &self,
        id: &str,
        update: &ParameterGroupUpdate,
    ) -> Result<()> {
        let url = self.rds_url(&format!("configurations/{id}"));
        self.put_empty(
            &url,
            &ParameterGroupRequest {
                name: update.name.clone(),
                description: update.description.clone(),
                values: update.values.clone(),
                datastore: None,
            },
        )
        .await
    }

    pub async fn delete_parameter_group(&self, id: &str) -> Result<()> {
        let url = self.rds_url(&format!("configurations/{id}"));
        tracing::info!("Deleting parameter group {id}");
        self.delete(&url).await
    }
}

// ============ API Types ============

#[derive(Debug, Serialize)]
struct ParameterGroupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    datastore: Option<DatastoreBody>,
}

#[derive(Debug, Serialize)]
struct DatastoreBody {
    #[serde(rename = "type")]
    r#type: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct ParameterGroupResponse {
    configuration: ParameterGroup,
}

#[derive(Debug, Deserialize)]
struct ListParameterGroupsResponse {
    #[serde(default)]
    configurations: Vec<ParameterGroup>,
}

/// A parameter group as reported by the API
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub datastore_name: String,
    #[serde(default)]
    pub datastore_version_name: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    /// Effective parameters, only present on single-group reads
    #[serde(default)]
    pub configuration_parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub restart_required: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub value_range: String,
    #[serde(default, rename = "type")]
    pub r#type: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_includes_datastore() {
        let body = serde_json::to_value(ParameterGroupRequest {
            name: Some("pg-tuned".to_string()),
            description: None,
            values: Some(HashMap::from([(
                "max_connections".to_string(),
                "500".to_string(),
            )])),
            datastore: Some(DatastoreBody {
                r#type: "PostgreSQL".to_string(),
                version: "16".to_string(),
            }),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "name": "pg-tuned",
                "values": { "max_connections": "500" },
                "datastore": { "type": "PostgreSQL", "version": "16" }
            })
        );
    }

    #[test]
    fn update_request_omits_unchanged_fields() {
        let body = serde_json::to_value(ParameterGroupRequest {
            name: None,
            description: Some("tuned for reporting".to_string()),
            values: None,
            datastore: None,
        })
        .unwrap();
        assert_eq!(body, json!({ "description": "tuned for reporting" }));
    }

    #[test]
    fn read_response_flattens_parameters() {
        let response: ParameterGroupResponse = serde_json::from_value(json!({
            "configuration": {
                "id": "cfg-01",
                "name": "pg-tuned",
                "datastore_name": "postgresql",
                "datastore_version_name": "16",
                "created": "2026-05-01T10:00:00+0000",
                "updated": "2026-05-01T10:00:00+0000",
                "configuration_parameters": [
                    {
                        "name": "max_connections",
                        "value": "500",
                        "restart_required": true,
                        "readonly": false,
                        "value_range": "1-262143",
                        "type": "integer",
                        "description": "maximum concurrent connections"
                    }
                ]
            }
        }))
        .unwrap();

        let group = response.configuration;
        assert_eq!(group.datastore_version_name, "16");
        let parameter = &group.configuration_parameters[0];
        assert!(parameter.restart_required);
        assert_eq!(parameter.value_range, "1-262143");
    }
}
