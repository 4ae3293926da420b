//! Copy-path planning for `porter`: the conversion cost model, the
//! copier capability registry, and the least-cost route planner.
//!
//! The planner is pure computation over a frozen [`CopierRegistry`];
//! execution lives in the `porter` crate.

mod copier;
mod cost;
mod path;
mod planner;

pub use copier::{
    Capability, CopierCaps, CopierRegistry, CopierRegistryBuilder, RegisteredCopier, RegistryError,
};
pub use cost::{CPU_WEIGHT, Cost, CostComponent, MEMORY_WEIGHT};
pub use path::{CopyEdge, CopyPath};
pub use planner::{DEFAULT_EXPECTED_RECORDS, PlanError, Planner};
