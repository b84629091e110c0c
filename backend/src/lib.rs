//! # Curriculum Crafter Backend
//!
//! Course-planning backend: students register, build multi-semester academic
//! plans, and query prerequisite and requirement data.
//!
//! ## Features
//!
//! - **Prerequisite graphs**: expand a course's full prerequisite chain into a
//!   deduplicated node/edge graph, tolerant of cycles in catalog data
//! - **Progress**: fulfilled/unfulfilled major requirements and planned credit
//!   totals per semester and per student
//! - **Plan mutations**: add courses under prerequisite and semester-limit
//!   rules, with an audited prerequisite bypass
//! - **HTTP API**: REST endpoints via axum
//!
//! ## Architecture
//!
//! - [`api`]: identifier newtypes and DTOs for API responses
//! - [`models`]: domain records and the catalog seed format
//! - [`routes`]: per-feature response types
//! - [`db`]: repository traits, in-memory and PostgreSQL stores, CRUD services
//! - [`services`]: graph builder, progress aggregator, plan mutation guard
//! - [`config`]: server and semester-limit configuration
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
