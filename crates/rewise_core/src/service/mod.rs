//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, scheduler and grouping calls into use-case
//!   level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod topic_service;
