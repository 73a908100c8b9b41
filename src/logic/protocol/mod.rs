//! Protocol Module - per-protocol statistics, entropy and rare pairs

pub mod types;
pub mod analyzer;

pub use types::{ProtocolAnalysis, ProtocolStats, ReferenceCombinations, UnusualCombination, UnusualReason};
pub use analyzer::{analyze_protocols, protocol_entropy, protocol_statistics, unusual_combinations};
