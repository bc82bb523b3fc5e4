//! Compute server groups
//!
//! Server groups only carry a name and placement policies and are created
//! synchronously, so there is no wait and no update operation: changing a
//! group means replacing it.

use crate::client::OtcClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Flat configuration for a server group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerGroupConfig {
    pub name: String,
    /// Placement policies, e.g. "anti-affinity"
    #[serde(default)]
    pub policies: Vec<String>,
}

impl OtcClient {
    pub async fn create_server_group(&self, config: &ServerGroupConfig) -> Result<ServerGroup> {
        let url = self.ecs_url("os-server-groups");
        tracing::info!("Creating server group {}", config.name);
        let response: ServerGroupResponse = self
            .post(
                &url,
                &CreateServerGroupRequest {
                    server_group: ServerGroupBody {
                        name: config.name.clone(),
                        policies: config.policies.clone(),
                    },
                },
            )
            .await?;
        Ok(response.server_group)
    }

    pub async fn get_server_group(&self, id: &str) -> Result<ServerGroup> {
        let url = self.ecs_url(&format!("os-server-groups/{id}"));
        let response: ServerGroupResponse = self.get(&url).await?;
        Ok(response.server_group)
    }

    pub async fn list_server_groups(&self) -> Result<Vec<ServerGroup>> {
        let url = self.ecs_url("os-server-groups");
        let response: ListServerGroupsResponse = self.get(&url).await?;
        Ok(response.server_groups)
    }

    pub async fn delete_server_group(&self, id: &str) -> Result<()> {
        let url = self.ecs_url(&format!("os-server-groups/{id}"));
        tracing::info!("Deleting server group {id}");
        self.delete(&url).await
    }
}

// ============ API Types ============

#[derive(Debug, Serialize)]
struct CreateServerGroupRequest {
    server_group: ServerGroupBody,
}

#[derive(Debug, Serialize)]
struct ServerGroupBody {
    name: String,
    policies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ServerGroupResponse {
    server_group: ServerGroup,
}

#[derive(Debug, Deserialize)]
struct ListServerGroupsResponse {
    #[serde(default)]
    server_groups: Vec<ServerGroup>,
}

/// A server group as reported by the API
#[derive(Debug, Clone, Deserialize)]
pub struct ServerGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub policies: Vec<String>,
    /// Server ids currently placed in this group
    #[serde(default)]
    pub members: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_wire_format() {
        let body = serde_json::to_value(CreateServerGroupRequest {
            server_group: ServerGroupBody {
                name: "web".to_string(),
                policies: vec!["anti-affinity".to_string()],
            },
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "server_group": { "name": "web", "policies": ["anti-affinity"] }
            })
        );
    }

    #[test]
    fn group_deserializes_with_members() {
        let response: ServerGroupResponse = serde_json::from_value(json!({
            "server_group": {
                "id": "sg-01",
                "name": "web",
                "policies": ["anti-affinity"],
                "members": ["s-01", "s-02"]
            }
        }))
        .unwrap();
        assert_eq!(response.server_group.members.len(), 2);
    }
}
