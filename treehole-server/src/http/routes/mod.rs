//! Route handlers organized by resource

pub mod health;
pub mod info;
pub mod messages;
pub mod not_found;
