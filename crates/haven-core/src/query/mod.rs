//! Counselor queries: asynchronous questions from students and the
//! counselors' written responses.

pub mod repository;
pub mod service;
