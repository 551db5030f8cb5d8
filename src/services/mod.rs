//! Business logic services.

pub mod audit;
pub mod dashboard;
pub mod documents;
pub mod institution;
pub mod lifecycle;
pub mod profile;
pub mod session;
pub mod stats;
