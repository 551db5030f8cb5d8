//! Database models and DTOs for all domain entities.

pub mod audit;
pub mod document;
pub mod institution;
pub mod pagination;
pub mod user;
