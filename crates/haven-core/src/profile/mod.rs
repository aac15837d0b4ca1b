//! User profiles and roles.

pub mod repository;
pub mod service;
