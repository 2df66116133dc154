/*!
 * Timeline Module
 * Sparse point-to-slot chains with monotonic prefix cursors
 */

pub mod chain;

pub use chain::TimelineChain;
