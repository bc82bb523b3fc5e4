//! CloudProvider implementation for Open Telekom Cloud

use crate::ces::AlarmRuleConfig;
use crate::client::{OtcClient, OtcConfig};
use crate::css::{CSS_CREATE_TIMEOUT, CSS_DELETE_TIMEOUT, ClusterConfig};
use crate::ecs::ServerGroupConfig;
use crate::error::OtcError;
use crate::evs::{EVS_CREATE_TIMEOUT, EVS_DELETE_TIMEOUT, VolumeConfig};
use crate::rds::ParameterGroupConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Instant;
use strato_cloud::{
    Action, ActionType, ApplyResult, AuthStatus, CloudError, CloudProvider, Plan, ProviderState,
    ResourceConfig, ResourceSet, ResourceState, ResourceStatus, Result,
};

pub const RESOURCE_VOLUME: &str = "evs-volume";
pub const RESOURCE_CLUSTER: &str = "css-cluster";
pub const RESOURCE_SERVER_GROUP: &str = "server-group";
pub const RESOURCE_PARAMETER_GROUP: &str = "rds-parameter-group";
pub const RESOURCE_ALARM_RULE: &str = "ces-alarm-rule";

/// Open Telekom Cloud provider
pub struct OtcProvider {
    client: OtcClient,
}

impl OtcProvider {
    pub fn new(config: OtcConfig) -> Self {
        Self {
            client: OtcClient::new(config),
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(OtcConfig::from_env()?))
    }

    pub fn client(&self) -> &OtcClient {
        &self.client
    }

    async fn create_resource(&self, action: &Action) -> std::result::Result<String, OtcError> {
        let config = action
            .details
            .get("config")
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        match action.resource_type.as_str() {
            RESOURCE_VOLUME => {
                let config: VolumeConfig = serde_json::from_value(config)?;
                let volume = self
                    .client
                    .create_volume(&config, EVS_CREATE_TIMEOUT)
                    .await?;
                Ok(volume.id)
            }
            RESOURCE_CLUSTER => {
                let config: ClusterConfig = serde_json::from_value(config)?;
                let cluster = self
                    .client
                    .create_cluster(&config, CSS_CREATE_TIMEOUT)
                    .await?;
                Ok(cluster.id)
            }
            RESOURCE_SERVER_GROUP => {
                let config: ServerGroupConfig = serde_json::from_value(config)?;
                let group = self.client.create_server_group(&config).await?;
                Ok(group.id)
            }
            RESOURCE_PARAMETER_GROUP => {
                let config: ParameterGroupConfig = serde_json::from_value(config)?;
                let group = self.client.create_parameter_group(&config).await?;
                Ok(group.id)
            }
            RESOURCE_ALARM_RULE => {
                let config: AlarmRuleConfig = serde_json::from_value(config)?;
                self.client.create_alarm_rule(&config).await
            }
            other => Err(OtcError::InvalidConfig(format!(
                "unknown resource type {other:?}"
            ))),
        }
    }

    async fn delete_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> std::result::Result<(), OtcError> {
        match resource_type {
            RESOURCE_VOLUME => self.client.delete_volume(id, true, EVS_DELETE_TIMEOUT).await,
            RESOURCE_CLUSTER => self.client.delete_cluster(id, CSS_DELETE_TIMEOUT).await,
            RESOURCE_SERVER_GROUP => self.client.delete_server_group(id).await,
            RESOURCE_PARAMETER_GROUP => self.client.delete_parameter_group(id).await,
            RESOURCE_ALARM_RULE => self.client.delete_alarm_rule(id).await,
            other => Err(OtcError::InvalidConfig(format!(
                "unknown resource type {other:?}"
            ))),
        }
    }

    /// Names of every live resource, grouped by resource type.
    async fn existing_names(&self) -> std::result::Result<HashMap<&'static str, Vec<String>>, OtcError> {
        let mut names = HashMap::new();
        names.insert(
            RESOURCE_VOLUME,
            self.client
                .list_volumes()
                .await?
                .into_iter()
                .map(|v| v.name)
                .collect(),
        );
        names.insert(
            RESOURCE_CLUSTER,
            self.client
                .list_clusters()
                .await?
                .into_iter()
                .map(|c| c.name)
                .collect(),
        );
        names.insert(
            RESOURCE_SERVER_GROUP,
            self.client
                .list_server_groups()
                .await?
                .into_iter()
                .map(|g| g.name)
                .collect(),
        );
        names.insert(
            RESOURCE_PARAMETER_GROUP,
            self.client
                .list_parameter_groups()
                .await?
                .into_iter()
                .map(|g| g.name)
                .collect(),
        );
        names.insert(
            RESOURCE_ALARM_RULE,
            self.client
                .list_alarm_rules()
                .await?
                .into_iter()
                .map(|r| r.alarm_name)
                .collect(),
        );
        Ok(names)
    }
}

#[async_trait]
impl CloudProvider for OtcProvider {
    fn name(&self) -> &str {
        "otc"
    }

    fn display_name(&self) -> &str {
        "Open Telekom Cloud"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        // Any authenticated read exercises the token; volumes is the cheapest.
        match self.client.list_volumes().await {
            Ok(_) => Ok(AuthStatus::ok(format!(
                "project {} in {}",
                self.client.project_id(),
                self.client.region()
            ))),
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn get_state(&self) -> Result<ProviderState> {
        let mut state = ProviderState::new();

        for volume in self.client.list_volumes().await.map_err(CloudError::from)? {
            state.add(
                format!("{RESOURCE_VOLUME}:{}", volume.id),
                ResourceState::new(&volume.id, RESOURCE_VOLUME)
                    .with_status(volume_status(&volume.status))
                    .with_attribute("name", serde_json::json!(volume.name))
                    .with_attribute("size", serde_json::json!(volume.size))
                    .with_attribute(
                        "availability_zone",
                        serde_json::json!(volume.availability_zone),
                    ),
            );
        }

        for cluster in self.client.list_clusters().await.map_err(CloudError::from)? {
            state.add(
                format!("{RESOURCE_CLUSTER}:{}", cluster.id),
                ResourceState::new(&cluster.id, RESOURCE_CLUSTER)
                    .with_status(cluster_status(&cluster.status))
                    .with_attribute("name", serde_json::json!(cluster.name))
                    .with_attribute("endpoint", serde_json::json!(cluster.endpoint))
                    .with_attribute("nodes", serde_json::json!(cluster.nodes.len())),
            );
        }

        for group in self
            .client
            .list_server_groups()
            .await
            .map_err(CloudError::from)?
        {
            state.add(
                format!("{RESOURCE_SERVER_GROUP}:{}", group.id),
                ResourceState::new(&group.id, RESOURCE_SERVER_GROUP)
                    .with_status(ResourceStatus::Available)
                    .with_attribute("name", serde_json::json!(group.name))
                    .with_attribute("policies", serde_json::json!(group.policies)),
            );
        }

        for group in self
            .client
            .list_parameter_groups()
            .await
            .map_err(CloudError::from)?
        {
            state.add(
                format!("{RESOURCE_PARAMETER_GROUP}:{}", group.id),
                ResourceState::new(&group.id, RESOURCE_PARAMETER_GROUP)
                    .with_status(ResourceStatus::Available)
                    .with_attribute("name", serde_json::json!(group.name)),
            );
        }

        for rule in self
            .client
            .list_alarm_rules()
            .await
            .map_err(CloudError::from)?
        {
            state.add(
                format!("{RESOURCE_ALARM_RULE}:{}", rule.alarm_id),
                ResourceState::new(&rule.alarm_id, RESOURCE_ALARM_RULE)
                    .with_status(ResourceStatus::Available)
                    .with_attribute("name", serde_json::json!(rule.alarm_name))
                    .with_attribute("enabled", serde_json::json!(rule.alarm_enabled)),
            );
        }

        Ok(state)
    }

    async fn plan(&self, desired: &ResourceSet) -> Result<Plan> {
        let existing = self.existing_names().await.map_err(CloudError::from)?;

        let mut actions = Vec::new();
        for resource in desired.iter() {
            let name = desired_name(resource);
            let present = existing
                .get(resource.resource_type.as_str())
                .is_some_and(|names| names.iter().any(|n| *n == name));

            let action_type = if present {
                ActionType::NoOp
            } else {
                ActionType::Create
            };
            actions.push(Action {
                id: resource.key(),
                action_type,
                resource_type: resource.resource_type.clone(),
                resource_id: resource.id.clone(),
                description: format!("{action_type} {} {name}", resource.resource_type),
                details: HashMap::from([("config".to_string(), resource.config.clone())]),
            });
        }

        // Live resources absent from the desired set are reported, never
        // deleted: destruction is always an explicit request.
        for (resource_type, names) in &existing {
            for name in names {
                let desired_here = desired
                    .by_type(resource_type)
                    .iter()
                    .any(|r| desired_name(r) == *name);
                if !desired_here {
                    tracing::debug!("Unmanaged {resource_type} {name:?} left untouched");
                }
            }
        }

        let plan = Plan::new(actions);
        tracing::info!("Plan: {}", plan.summary());
        Ok(plan)
    }

    async fn apply(&self, plan: &Plan) -> Result<ApplyResult> {
        let started = Instant::now();
        let mut result = ApplyResult::new();

        for action in &plan.actions {
            match action.action_type {
                ActionType::NoOp => {}
                ActionType::Create => match self.create_resource(action).await {
                    Ok(id) => {
                        tracing::info!("Created {} {id}", action.resource_type);
                        result.add_success(
                            action.id.clone(),
                            format!("created {} {id}", action.resource_type),
                        );
                    }
                    Err(e) => {
                        tracing::error!("Failed to create {}: {e}", action.id);
                        result.add_failure(action.id.clone(), e.to_string());
                    }
                },
                ActionType::Delete => {
                    match self
                        .delete_resource(&action.resource_type, &action.resource_id)
                        .await
                    {
                        Ok(()) => result.add_success(
                            action.id.clone(),
                            format!("deleted {} {}", action.resource_type, action.resource_id),
                        ),
                        Err(e) => {
                            tracing::error!("Failed to delete {}: {e}", action.id);
                            result.add_failure(action.id.clone(), e.to_string());
                        }
                    }
                }
                ActionType::Update => {
                    // Every managed type is immutable or replace-only here.
                    result.add_failure(
                        action.id.clone(),
                        "in-place update is not supported; replace the resource".to_string(),
                    );
                }
            }
        }

        result.duration_ms = started.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn destroy(&self, resource_key: &str) -> Result<()> {
        let (resource_type, id) = split_key(resource_key).ok_or_else(|| {
            CloudError::InvalidConfig(format!(
                "resource key {resource_key:?} is not of the form type:id"
            ))
        })?;
        self.delete_resource(resource_type, id)
            .await
            .map_err(CloudError::from)
    }

    async fn destroy_all(&self) -> Result<ApplyResult> {
        let started = Instant::now();
        let state = self.get_state().await?;
        let mut result = ApplyResult::new();

        for (key, resource) in state.iter() {
            match self
                .delete_resource(&resource.resource_type, &resource.id)
                .await
            {
                Ok(()) => result.add_success(key.clone(), format!("deleted {key}")),
                Err(e) => {
                    tracing::error!("Failed to delete {key}: {e}");
                    result.add_failure(key.clone(), e.to_string());
                }
            }
        }

        result.duration_ms = started.elapsed().as_millis() as u64;
        Ok(result)
    }
}

/// Display name the desired resource should carry on the provider side
fn desired_name(resource: &ResourceConfig) -> String {
    resource
        .get_config::<String>("name")
        .or_else(|| resource.get_config::<String>("alarm_name"))
        .unwrap_or_else(|| resource.id.clone())
}

fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(':').filter(|(t, id)| !t.is_empty() && !id.is_empty())
}

fn volume_status(status: &str) -> ResourceStatus {
    match status {
        "creating" | "downloading" => ResourceStatus::Creating,
        "available" => ResourceStatus::Available,
        "in-use" => ResourceStatus::InUse,
        "deleting" => ResourceStatus::Deleting,
        s if s.starts_with("error") => ResourceStatus::Error,
        _ => ResourceStatus::Unknown,
    }
}

// Search clusters report numeric status strings.
fn cluster_status(status: &str) -> ResourceStatus {
    match status {
        "100" => ResourceStatus::Creating,
        "200" => ResourceStatus::Available,
        "303" => ResourceStatus::Error,
        _ => ResourceStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn volume_statuses_map_to_lifecycle() {
        assert_eq!(volume_status("creating"), ResourceStatus::Creating);
        assert_eq!(volume_status("available"), ResourceStatus::Available);
        assert_eq!(volume_status("in-use"), ResourceStatus::InUse);
        assert_eq!(volume_status("error_restoring"), ResourceStatus::Error);
        assert_eq!(volume_status("reserved"), ResourceStatus::Unknown);
    }

    #[test]
    fn cluster_statuses_map_to_lifecycle() {
        assert_eq!(cluster_status("100"), ResourceStatus::Creating);
        assert_eq!(cluster_status("200"), ResourceStatus::Available);
        assert_eq!(cluster_status("42"), ResourceStatus::Unknown);
    }

    #[test]
    fn resource_keys_split_into_type_and_id() {
        assert_eq!(split_key("evs-volume:v-01"), Some(("evs-volume", "v-01")));
        assert_eq!(split_key("no-separator"), None);
        assert_eq!(split_key(":v-01"), None);
    }

    #[test]
    fn desired_name_prefers_explicit_name_fields() {
        let volume = ResourceConfig::new("evs-volume", "data", "otc", json!({ "name": "data-01" }));
        assert_eq!(desired_name(&volume), "data-01");

        let alarm = ResourceConfig::new(
            "ces-alarm-rule",
            "egress",
            "otc",
            json!({ "alarm_name": "high-egress" }),
        );
        assert_eq!(desired_name(&alarm), "high-egress");

        let unnamed = ResourceConfig::new("server-group", "web", "otc", json!({}));
        assert_eq!(desired_name(&unnamed), "web");
    }
}
