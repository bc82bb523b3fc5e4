//! Open Telekom Cloud provider
//!
//! Implements [`strato_cloud::CloudProvider`] against the Open Telekom
//! Cloud REST APIs. One [`OtcClient`] serves every service; each service
//! module hangs its lifecycle calls off the client and keeps its wire
//! types private:
//!
//! - [`css`] — search clusters (create / extend / delete, polled)
//! - [`evs`] — block storage volumes (job-based creation)
//! - [`ecs`] — compute server groups
//! - [`rds`] — database parameter groups
//! - [`ces`] — monitoring alarm rules
//! - [`iam`] — identity group lookup (data source)
//! - [`dds`] — document database flavor lookup (data source)
//!
//! Asynchronous operations share one pattern: issue the request, then poll
//! with a [`strato_cloud::WaitSpec`] until the resource reaches its target
//! state or the window closes.

pub mod ces;
pub mod client;
pub mod css;
pub mod dds;
pub mod ecs;
pub mod error;
pub mod evs;
pub mod iam;
pub mod provider;
pub mod rds;

// Re-exports
pub use ces::{AlarmRule, AlarmRuleConfig};
pub use client::{OtcClient, OtcConfig};
pub use css::{Cluster, ClusterConfig};
pub use dds::{DdsFlavor, FlavorFilter};
pub use ecs::{ServerGroup, ServerGroupConfig};
pub use error::{OtcError, Result};
pub use evs::{Volume, VolumeConfig};
pub use iam::Group;
pub use provider::OtcProvider;
pub use rds::{ParameterGroup, ParameterGroupConfig, ParameterGroupUpdate};
