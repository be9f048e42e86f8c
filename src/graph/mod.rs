//! Optional dependency gating.
//!
//! The default scheduler orders by priority alone. Under
//! `DependencyPolicy::GateStart` the eligible tasks are first rearranged into a
//! topological order that keeps priority order wherever dependencies allow it.

pub mod dependency_dag;

pub use dependency_dag::DependencyDag;
