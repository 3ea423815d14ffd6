//! Cloud Foundry V3 resource types.

mod app;
mod audit_event;
mod common;
mod job;
mod organization;
mod organization_quota;
mod revision;
mod service_instance;
mod sidecar;
mod space;
mod usage_event;

pub use app::*;
pub use audit_event::*;
pub use common::*;
pub use job::*;
pub use organization::*;
pub use organization_quota::*;
pub use revision::*;
pub use service_instance::*;
pub use sidecar::*;
pub use space::*;
pub use usage_event::*;
