//! Cloud Search Service clusters
//!
//! Cluster provisioning is asynchronous: the create call returns an id and
//! the cluster then moves through status `100` (creating) to `200`
//! (available). Extension and deletion are likewise observed by polling.

use crate::client::OtcClient;
use crate::error::{OtcError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strato_cloud::{WaitSpec, wait_for_state};

/// Create timeout used when the caller does not override it
pub const CSS_CREATE_TIMEOUT: Duration = Duration::from_secs(15 * 60);
/// Extension can reshuffle shards and takes far longer than creation
pub const CSS_EXTEND_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const CSS_DELETE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Flat configuration for a search cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub name: String,
    pub flavor: String,
    pub network_id: String,
    pub security_group_id: String,
    pub vpc_id: String,
    pub volume_size: u32,
    pub volume_type: String,
    #[serde(default)]
    pub encryption_key: Option<String>,
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub enable_https: bool,
    #[serde(default = "default_node_num")]
    pub expect_node_num: u32,
}

fn default_node_num() -> u32 {
    1
}

impl ClusterConfig {
    /// Expand the flat configuration into the nested create request body.
    fn to_create_request(&self) -> CreateClusterRequest {
        CreateClusterRequest {
            cluster: ClusterBody {
                name: self.name.clone(),
                instance_num: self.expect_node_num,
                // The API takes these switches as strings, not booleans.
                https_enable: if self.enable_https { "true" } else { "false" }.to_string(),
                disk_encryption: DiskEncryption {
                    system_encrypted: if self.encryption_key.is_some() { "1" } else { "0" }
                        .to_string(),
                    system_cmkid: self.encryption_key.clone(),
                },
                instance: InstanceBody {
                    flavor_ref: self.flavor.clone(),
                    availability_zone: self.availability_zone.clone(),
                    nics: Nics {
                        net_id: self.network_id.clone(),
                        security_group_id: self.security_group_id.clone(),
                        vpc_id: self.vpc_id.clone(),
                    },
                    volume: VolumeBody {
                        size: self.volume_size,
                        volume_type: self.volume_type.clone(),
                    },
                },
            },
        }
    }
}

impl OtcClient {
    /// Create a cluster and wait until it reports status `200`.
    pub async fn create_cluster(
        &self,
        config: &ClusterConfig,
        timeout: Duration,
    ) -> Result<Cluster> {
        let url = self.css_url("clusters");
        tracing::info!("Creating search cluster {}", config.name);

        let created: CreateClusterResponse = self.post(&url, &config.to_create_request()).await?;
        let id = created.cluster.id;
        tracing::debug!("Cluster {} accepted, waiting for availability", id);

        let spec = WaitSpec::new(["200"], ["100"], timeout, POLL_INTERVAL);
        let cluster = wait_for_state(&spec, || {
            let id = id.clone();
            async move {
                let cluster = self.get_cluster(&id).await?;
                let status = cluster.status.clone();
                Ok::<_, OtcError>((cluster, status))
            }
        })
        .await?;
        Ok(cluster)
    }

    pub async fn get_cluster(&self, id: &str) -> Result<Cluster> {
        let url = self.css_url(&format!("clusters/{id}"));
        self.get(&url).await
    }

    pub async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        let url = self.css_url("clusters");
        let response: ListClustersResponse = self.get(&url).await?;
        Ok(response.clusters)
    }

    /// Grow the cluster to `target_nodes` nodes and wait for the new nodes
    /// to come up. Shrinking is not supported by the service; a target at
    /// or below the current size is a no-op.
    pub async fn extend_cluster(
        &self,
        id: &str,
        target_nodes: u32,
        timeout: Duration,
    ) -> Result<Cluster> {
        let current = self.get_cluster(id).await?;
        let have = current.nodes.len() as u32;
        if target_nodes <= have {
            return Ok(current);
        }

        let url = self.css_url(&format!("clusters/{id}/extend"));
        tracing::info!("Extending cluster {id} from {have} to {target_nodes} nodes");
        let _: serde_json::Value = self
            .post(
                &url,
                &ExtendClusterRequest {
                    grow: Grow {
                        modify_size: target_nodes - have,
                    },
                },
            )
            .await?;

        let spec = WaitSpec::new(["Done"], ["Pending"], timeout, POLL_INTERVAL);
        let cluster = wait_for_state(&spec, || async move {
            let cluster = self.get_cluster(id).await?;
            let done = cluster.status == "200" && cluster.nodes.len() as u32 >= target_nodes;
            let label = if done { "Done" } else { "Pending" };
            Ok::<_, OtcError>((cluster, label.to_string()))
        })
        .await?;
        Ok(cluster)
    }

    /// Delete a cluster and wait until reads of it return 404.
    pub async fn delete_cluster(&self, id: &str, timeout: Duration) -> Result<()> {
        let url = self.css_url(&format!("clusters/{id}"));
        tracing::info!("Deleting search cluster {id}");
        self.delete(&url).await?;

        let spec = WaitSpec::new(["Done"], ["Pending"], timeout, POLL_INTERVAL);
        wait_for_state(&spec, || async move {
            match self.get_cluster(id).await {
                Ok(_) => Ok(((), "Pending".to_string())),
                Err(OtcError::ResourceNotFound(_)) => Ok(((), "Done".to_string())),
                // Anything else is a transient read failure; keep polling.
                Err(e) => Err(e),
            }
        })
        .await?;
        Ok(())
    }
}

// ============ API Types ============

#[derive(Debug, Serialize)]
struct CreateClusterRequest {
    cluster: ClusterBody,
}

#[derive(Debug, Serialize)]
struct ClusterBody {
    name: String,
    #[serde(rename = "instanceNum")]
    instance_num: u32,
    #[serde(rename = "httpsEnable")]
    https_enable: String,
    #[serde(rename = "diskEncryption")]
    disk_encryption: DiskEncryption,
    instance: InstanceBody,
}

#[derive(Debug, Serialize)]
struct DiskEncryption {
    #[serde(rename = "systemEncrypted")]
    system_encrypted: String,
    #[serde(rename = "systemCmkid", skip_serializing_if = "Option::is_none")]
    system_cmkid: Option<String>,
}

#[derive(Debug, Serialize)]
struct InstanceBody {
    #[serde(rename = "flavorRef")]
    flavor_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    availability_zone: Option<String>,
    nics: Nics,
    volume: VolumeBody,
}

#[derive(Debug, Serialize)]
struct Nics {
    #[serde(rename = "netId")]
    net_id: String,
    #[serde(rename = "securityGroupId")]
    security_group_id: String,
    #[serde(rename = "vpcId")]
    vpc_id: String,
}

#[derive(Debug, Serialize)]
struct VolumeBody {
    size: u32,
    volume_type: String,
}

#[derive(Debug, Serialize)]
struct ExtendClusterRequest {
    grow: Grow,
}

#[derive(Debug, Serialize)]
struct Grow {
    #[serde(rename = "modifySize")]
    modify_size: u32,
}

#[derive(Debug, Deserialize)]
struct CreateClusterResponse {
    cluster: CreatedCluster,
}

#[derive(Debug, Deserialize)]
struct CreatedCluster {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListClustersResponse {
    #[serde(default)]
    clusters: Vec<Cluster>,
}

/// A search cluster as reported by the API
#[derive(Debug, Clone, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub datastore: Option<Datastore>,
    #[serde(default, rename = "httpsEnable")]
    pub https_enable: Option<bool>,
    #[serde(default, rename = "subnetId")]
    pub network_id: Option<String>,
    #[serde(default, rename = "securityGroupId")]
    pub security_group_id: Option<String>,
    #[serde(default, rename = "vpcId")]
    pub vpc_id: Option<String>,
    #[serde(default, rename = "cmkId")]
    pub encryption_key: Option<String>,
    #[serde(default, rename = "instances")]
    pub nodes: Vec<ClusterNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Datastore {
    #[serde(rename = "type")]
    pub r#type: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
}
