//! Building blocks shared by the scoreboard services: the HTTP accept loop,
//! the admin (health/readiness) service and metric definitions.

pub mod admin_service;
pub mod http;
pub mod metrics_defs;
