//! Domain layer for Convex Guardian
//!
//! CDD Principle: Domain Model - Pure business logic for configuration rule enforcement
//! - Rules are declarative value objects describing expectations about configuration paths
//! - Violations and evaluation results are produced by the evaluator and never mutated
//! - Independent of file systems, terminals and document formats

pub mod rules;
pub mod violations;

// Re-export main domain types for convenience
pub use rules::*;
pub use violations::*;
