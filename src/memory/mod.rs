pub mod bank;
pub mod engine;
pub mod lane;
pub mod search;
pub mod stats;
pub mod types;

pub use engine::{EngineState, IngestOutcome, MemoryEngine};
pub use lane::detect_lane;
