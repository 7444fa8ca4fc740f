//! Mentor-Buddy client: typed REST client, review workflow rules, dashboard
//! poller and the backend keep-alive service.

pub mod api;
pub mod cache;
pub mod config;
pub mod keepalive;
pub mod model;
pub mod poll;
pub mod roles;
pub mod routes;
pub mod state;
pub mod workflow;
