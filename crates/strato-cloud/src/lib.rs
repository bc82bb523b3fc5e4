//! Strato cloud core
//!
//! Provider-neutral building blocks for declarative cloud resource
//! management: the [`CloudProvider`] trait, plan/apply action types, local
//! state tracking, and the wait/navigation primitives every provider needs
//! for asynchronous provisioning APIs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    host tool                     │
//! │            (plan / apply / destroy)              │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                strato-cloud                      │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          Provider Abstraction             │   │
//! │  │  trait CloudProvider { ... }              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ State Waiter │  │  State Mgmt  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────────────────┬─────────────────────────────┘
//!                     │
//!             ┌───────▼───────┐
//!             │ strato-cloud- │
//!             │      otc      │
//!             └───────────────┘
//! ```
//!
//! Each wait is a [`waiter::WaitSpec`] plus a poll closure, constructed per
//! lifecycle call and discarded afterwards; concurrent waits on different
//! resources share nothing.

pub mod action;
pub mod error;
pub mod provider;
pub mod state;
pub mod value;
pub mod waiter;

// Re-exports
pub use action::{Action, ActionType, ApplyResult, Plan, PlanSummary};
pub use error::{CloudError, Result};
pub use provider::{AuthStatus, CloudProvider, ResourceConfig, ResourceSet};
pub use state::{
    GlobalState, ProviderState, ResourceState, ResourceStatus, StateLock, StateManager,
};
pub use value::{PathError, navigate_i64, navigate_str, navigate_value};
pub use waiter::{WaitSpec, wait_for_state};
