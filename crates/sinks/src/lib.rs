//! Chainload - Sinks
//!
//! Output sinks for chain records.
//!
//! # Available Sinks
//!
//! | Sink | Purpose |
//! |------|---------|
//! | `starrocks` | Staging files bulk-loaded via StarRocks stream load |

// =============================================================================
// Sink implementations
// =============================================================================

/// StarRocks sink - per-type staging files and stream load
pub mod starrocks;
