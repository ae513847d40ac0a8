//! SurfsUp climate API.
//!
//! Read-only HTTP service over a fixed snapshot of Hawaiian weather-station
//! data: a `station` table and a daily `measurement` table.
//!
//! - `query::QueryService` answers the five fixed queries.
//! - `repository` abstracts the store (Postgres in production, memory in tests).
//! - `api::router` exposes the service over HTTP.

pub mod analysis;
pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repository;
pub mod stations;
pub mod verify;
