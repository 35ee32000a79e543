// All core functionality is in sdsgraph-core
// This CLI acts as a thin batch driver around the core library

// CLI-specific modules
pub mod batch;

// Re-export core types for convenience
pub use sdsgraph_core::*;

// Re-export CLI utilities
pub use batch::{collect_inputs, run_batch, BatchOptions, BatchSummary};
