//! HTTP surface for the campus event platform.

pub mod audit;
pub mod auth;
pub mod background;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod routes;
pub mod scope;
pub mod state;
