//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the topic-store contract consumed by services and jobs.
//! - Isolate SQLite query details from scheduling and grouping logic.
//!
//! # Invariants
//! - Repository writes must enforce `Topic::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod topic_repo;
