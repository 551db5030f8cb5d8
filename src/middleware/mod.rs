//! Request extractors: session resolution and role gates.

pub mod auth;
pub mod rbac;
