//! Cloud Eye alarm rules
//!
//! Alarm rules are the one resource whose update path is not a field patch:
//! everything except the enabled switch is immutable, and the switch is
//! flipped through a dedicated action endpoint.

use crate::client::OtcClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Flat configuration for an alarm rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmRuleConfig {
    pub alarm_name: String,
    pub metric: Metric,
    pub condition: Condition,
    #[serde(default)]
    pub alarm_actions: Vec<AlarmAction>,
    #[serde(default = "default_true")]
    pub alarm_enabled: bool,
    #[serde(default)]
    pub alarm_action_enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Which metric the rule watches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    /// Service namespace, e.g. "SYS.ECS"
    pub namespace: String,
    pub metric_name: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

/// When the rule fires
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    /// Aggregation window in seconds
    pub period: u32,
    /// Aggregation function, e.g. "average"
    pub filter: String,
    pub comparison_operator: String,
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
    /// Consecutive windows before the alarm fires
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmAction {
    /// Action kind, e.g. "notification"
    #[serde(rename = "type")]
    pub r#type: String,
    #[serde(rename = "notificationList")]
    pub notification_list: Vec<String>,
}

impl OtcClient {
    pub async fn create_alarm_rule(&self, config: &AlarmRuleConfig) -> Result<String> {
        let url = self.ces_url("alarms");
        tracing::info!("Creating alarm rule {}", config.alarm_name);
        let response: CreateAlarmResponse = self.post(&url, config).await?;
        Ok(response.alarm_id)
    }

    pub async fn get_alarm_rule(&self, id: &str) -> Result<AlarmRule> {
        let url = self.ces_url(&format!("alarms/{id}"));
        let response: GetAlarmResponse = self.get(&url).await?;
        // The service wraps even single-rule reads in a list.
        response
            .metric_alarms
            .into_iter()
            .next()
            .ok_or_else(|| crate::error::OtcError::ResourceNotFound(format!("alarm rule {id}")))
    }

    pub async fn list_alarm_rules(&self) -> Result<Vec<AlarmRule>> {
        let url = self.ces_url("alarms");
        let response: GetAlarmResponse = self.get(&url).await?;
        Ok(response.metric_alarms)
    }

    /// Switch the rule on or off; all other fields are immutable.
    pub async fn set_alarm_rule_enabled(&self, id: &str, enabled: bool) -> Result<()> {
        let url = self.ces_url(&format!("alarms/{id}/action"));
        tracing::info!(
            "{} alarm rule {id}",
            if enabled { "Enabling" } else { "Disabling" }
        );
        self.put_empty(
            &url,
            &AlarmActionRequest {
                alarm_enabled: enabled,
            },
        )
        .await
    }

    pub async fn delete_alarm_rule(&self, id: &str) -> Result<()> {
        let url = self.ces_url(&format!("alarms/{id}"));
        tracing::info!("Deleting alarm rule {id}");
        self.delete(&url).await
    }
}

// ============ API Types ============

#[derive(Debug, Serialize)]
struct AlarmActionRequest {
    alarm_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct CreateAlarmResponse {
    alarm_id: String,
}

#[derive(Debug, Deserialize)]
struct GetAlarmResponse {
    #[serde(default)]
    metric_alarms: Vec<AlarmRule>,
}

/// An alarm rule as reported by the API
#[derive(Debug, Clone, Deserialize)]
pub struct AlarmRule {
    pub alarm_id: String,
    pub alarm_name: String,
    pub metric: Metric,
    pub condition: Condition,
    #[serde(default)]
    pub alarm_actions: Vec<AlarmAction>,
    #[serde(default)]
    pub alarm_enabled: bool,
    #[serde(default)]
    pub alarm_action_enabled: bool,
    #[serde(default)]
    pub alarm_state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> AlarmRuleConfig {
        AlarmRuleConfig {
            alarm_name: "high-egress".to_string(),
            metric: Metric {
                namespace: "SYS.ECS".to_string(),
                metric_name: "network_outgoing_bytes_rate_inband".to_string(),
                dimensions: vec![Dimension {
                    name: "instance_id".to_string(),
                    value: "i-01".to_string(),
                }],
            },
            condition: Condition {
                period: 300,
                filter: "average".to_string(),
                comparison_operator: ">".to_string(),
                value: 6.0,
                unit: Some("B/s".to_string()),
                count: 1,
            },
            alarm_actions: vec![AlarmAction {
                r#type: "notification".to_string(),
                notification_list: vec!["urn:smn:eu-de:topic-01".to_string()],
            }],
            alarm_enabled: true,
            alarm_action_enabled: false,
        }
    }

    #[test]
    fn create_request_wire_format() {
        let body = serde_json::to_value(config()).unwrap();
        assert_eq!(
            body,
            json!({
                "alarm_name": "high-egress",
                "metric": {
                    "namespace": "SYS.ECS",
                    "metric_name": "network_outgoing_bytes_rate_inband",
                    "dimensions": [{ "name": "instance_id", "value": "i-01" }]
                },
                "condition": {
                    "period": 300,
                    "filter": "average",
                    "comparison_operator": ">",
                    "value": 6.0,
                    "unit": "B/s",
                    "count": 1
                },
                "alarm_actions": [
                    { "type": "notification", "notificationList": ["urn:smn:eu-de:topic-01"] }
                ],
                "alarm_enabled": true,
                "alarm_action_enabled": false
            })
        );
    }

    #[test]
    fn single_rule_reads_are_wrapped_in_a_list() {
        let response: GetAlarmResponse = serde_json::from_value(json!({
            "metric_alarms": [{
                "alarm_id": "al-01",
                "alarm_name": "high-egress",
                "metric": {
                    "namespace": "SYS.ECS",
                    "metric_name": "network_outgoing_bytes_rate_inband"
                },
                "condition": {
                    "period": 300,
                    "filter": "average",
                    "comparison_operator": ">",
                    "value": 6.0,
                    "count": 1
                },
                "alarm_enabled": false,
                "alarm_state": "alarm"
            }]
        }))
        .unwrap();

        let rule = &response.metric_alarms[0];
        assert!(!rule.alarm_enabled);
        assert_eq!(rule.alarm_state.as_deref(), Some("alarm"));
    }
}
