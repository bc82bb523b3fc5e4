//! Elastic Volume Service
//!
//! Volume creation is job-based: the create call returns a `job_id` and the
//! volume id only appears in the finished job's `entities` block, whose
//! shape depends on the job kind — one of the few places a typed response
//! struct does not fit and path navigation is used instead.

use crate::client::OtcClient;
use crate::error::{OtcError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use strato_cloud::{CloudError, WaitSpec, navigate_str, wait_for_state};

pub const EVS_CREATE_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const EVS_DELETE_TIMEOUT: Duration = Duration::from_secs(3 * 60);

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Flat configuration for a block storage volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// Required unless the volume is restored from a backup
    #[serde(default)]
    pub size: Option<u32>,
    pub availability_zone: String,
    pub volume_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub backup_id: Option<String>,
    /// "VBD" or "SCSI"
    #[serde(default = "default_device_type")]
    pub device_type: String,
    /// KMS key id; setting it turns on volume encryption
    #[serde(default)]
    pub kms_id: Option<String>,
    #[serde(default)]
    pub multiattach: bool,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Delete snapshots together with the volume
    #[serde(default = "default_cascade")]
    pub cascade: bool,
}

fn default_device_type() -> String {
    "VBD".to_string()
}

fn default_cascade() -> bool {
    true
}

impl VolumeConfig {
    fn validate(&self) -> Result<()> {
        if self.size.is_none() && self.backup_id.is_none() {
            return Err(OtcError::InvalidConfig(
                "'size' is required unless the volume is restored from 'backup_id'".to_string(),
            ));
        }
        if self.device_type != "VBD" && self.device_type != "SCSI" {
            return Err(OtcError::InvalidConfig(format!(
                "device_type must be \"VBD\" or \"SCSI\", got {:?}",
                self.device_type
            )));
        }
        Ok(())
    }

    fn to_create_request(&self) -> CreateVolumeRequest {
        let mut metadata = HashMap::new();
        if let Some(kms_id) = &self.kms_id {
            metadata.insert("__system__cmkid".to_string(), kms_id.clone());
            metadata.insert("__system__encrypted".to_string(), "1".to_string());
        }
        if self.device_type == "SCSI" {
            metadata.insert("hw:passthrough".to_string(), "true".to_string());
        }

        CreateVolumeRequest {
            volume: VolumeCreateBody {
                name: self.name.clone(),
                size: self.size,
                availability_zone: self.availability_zone.clone(),
                description: self.description.clone(),
                snapshot_id: self.snapshot_id.clone(),
                image_ref: self.image_id.clone(),
                backup_id: self.backup_id.clone(),
                volume_type: self.volume_type.clone(),
                multiattach: self.multiattach,
                metadata: if metadata.is_empty() {
                    None
                } else {
                    Some(metadata)
                },
                tags: if self.tags.is_empty() {
                    None
                } else {
                    Some(self.tags.clone())
                },
            },
        }
    }
}

impl OtcClient {
    /// Create a volume and wait for its provisioning job to succeed.
    pub async fn create_volume(&self, config: &VolumeConfig, timeout: Duration) -> Result<Volume> {
        config.validate()?;

        let url = self.evs_url("volumes");
        tracing::info!(
            "Creating volume {}",
            config.name.as_deref().unwrap_or("(unnamed)")
        );
        let accepted: JobResponse = self.post(&url, &config.to_create_request()).await?;
        tracing::debug!("Volume creation accepted as job {}", accepted.job_id);

        let job = self.wait_for_job(&accepted.job_id, timeout).await?;
        let volume_id = navigate_str(&job, &["entities", "volume_id"], None)?;
        tracing::info!("Volume {volume_id} available");
        self.get_volume(volume_id).await
    }

    pub async fn get_volume(&self, id: &str) -> Result<Volume> {
        let url = self.evs_url(&format!("volumes/{id}"));
        let response: GetVolumeResponse = self.get(&url).await?;
        Ok(response.volume)
    }

    pub async fn list_volumes(&self) -> Result<Vec<Volume>> {
        let url = self.evs_url("volumes");
        let response: ListVolumesResponse = self.get(&url).await?;
        Ok(response.volumes)
    }

    /// Update name and/or description in place.
    pub async fn update_volume(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Volume> {
        let url = self.evs_url(&format!("volumes/{id}"));
        let response: GetVolumeResponse = self
            .put(
                &url,
                &UpdateVolumeRequest {
                    volume: VolumeUpdateBody {
                        name: name.map(str::to_string),
                        description: description.map(str::to_string),
                    },
                },
            )
            .await?;
        Ok(response.volume)
    }

    /// Replace the volume's tags wholesale.
    pub async fn set_volume_tags(&self, id: &str, tags: &HashMap<String, String>) -> Result<()> {
        let url = self.evs_url(&format!("volumes/{id}/tags/action"));
        let tags = tags
            .iter()
            .map(|(key, value)| Tag {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        self.post_empty(
            &url,
            &TagActionRequest {
                action: "create".to_string(),
                tags,
            },
        )
        .await
    }

    /// Delete a volume and wait until reads of it return 404.
    pub async fn delete_volume(&self, id: &str, cascade: bool, timeout: Duration) -> Result<()> {
        let url = self.evs_url(&format!("volumes/{id}?cascade={cascade}"));
        tracing::info!("Deleting volume {id}");
        self.delete(&url).await?;

        let spec = WaitSpec::new(["Done"], ["Pending"], timeout, POLL_INTERVAL);
        wait_for_state(&spec, || async move {
            match self.get_volume(id).await {
                Ok(_) => Ok(((), "Pending".to_string())),
                Err(OtcError::ResourceNotFound(_)) => Ok(((), "Done".to_string())),
                Err(e) => Err(e),
            }
        })
        .await?;
        Ok(())
    }

    /// Poll a block-storage job until it reports `SUCCESS`.
    ///
    /// `RUNNING` and `INIT` keep the wait going; a reported `FAIL` is
    /// outside both label sets and surfaces as a job failure immediately.
    pub(crate) async fn wait_for_job(
        &self,
        job_id: &str,
        timeout: Duration,
    ) -> Result<serde_json::Value> {
        let url = self.evs_job_url(job_id);
        let spec = WaitSpec::new(["SUCCESS"], ["RUNNING", "INIT"], timeout, POLL_INTERVAL);

        let job = wait_for_state(&spec, || {
            let url = url.clone();
            async move {
                let body: serde_json::Value = self.get(&url).await?;
                let status = navigate_str(&body, &["status"], None)
                    .map_err(CloudError::from)?
                    .to_string();
                Ok::<_, OtcError>((body, status))
            }
        })
        .await
        .map_err(|e| match e {
            CloudError::UnexpectedState(state) => {
                OtcError::JobFailed(job_id.to_string(), format!("job reported state {state:?}"))
            }
            other => OtcError::Cloud(other),
        })?;
        Ok(job)
    }
}

// ============ API Types ============

#[derive(Debug, Serialize)]
struct CreateVolumeRequest {
    volume: VolumeCreateBody,
}

#[derive(Debug, Serialize)]
struct VolumeCreateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u32>,
    availability_zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot_id: Option<String>,
    #[serde(rename = "imageRef", skip_serializing_if = "Option::is_none")]
    image_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backup_id: Option<String>,
    volume_type: String,
    multiattach: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize)]
struct UpdateVolumeRequest {
    volume: VolumeUpdateBody,
}

#[derive(Debug, Serialize)]
struct VolumeUpdateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct TagActionRequest {
    action: String,
    tags: Vec<Tag>,
}

#[derive(Debug, Serialize)]
struct Tag {
    key: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct GetVolumeResponse {
    volume: Volume,
}

#[derive(Debug, Deserialize)]
struct ListVolumesResponse {
    #[serde(default)]
    volumes: Vec<Volume>,
}

/// A volume as reported by the API
#[derive(Debug, Clone, Deserialize)]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub availability_zone: String,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub volume_type: String,
    #[serde(default)]
    pub multiattach: bool,
    /// World-wide name, set once the volume is provisioned
    #[serde(default)]
    pub wwn: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub attachments: Vec<VolumeAttachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolumeAttachment {
    #[serde(default)]
    pub id: String,
    pub server_id: String,
    pub device: String,
}
