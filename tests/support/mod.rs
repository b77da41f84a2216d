//! Shared helpers for the integration tests: a fake GitHub API served by
//! Wiremock and a publisher configured to talk to it.

pub mod github_api;
pub mod scenario;
