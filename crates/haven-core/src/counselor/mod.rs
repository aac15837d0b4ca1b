//! Counselor directory: listing, lookup, and admin management.

pub mod repository;
pub mod service;
