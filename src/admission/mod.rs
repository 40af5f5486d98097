pub mod context;
pub mod layer;
pub mod resolver;

// Re-export the primary admission items so code outside can do
// "use crate::admission::{AdmissionResolver, ResolvedContext};"
pub use context::ResolvedContext;
pub use resolver::{AdmissionError, AdmissionResolver};
