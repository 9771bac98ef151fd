//! Preparation versioning.
//!
//! A preparation's history is an immutable chain of [`Step`]s ending at the
//! shared root step. Each step references a content blob holding the actions
//! it appended; replaying the chain from the root yields the ordered action
//! list the executor runs.
//!
//! Orphaned steps (not reachable from any head) are left in the repository;
//! reclaiming them is up to an external sweep.

mod chain;
mod lock;
mod model;
mod repository;
mod service;
mod step;

pub use chain::StepChain;
pub use lock::{EntityLock, LockRegistry};
pub use model::Preparation;
pub use repository::{
    Entity, EntityKind, InMemoryRepository, PreparationRepository, RepositoryExt,
};
pub use service::{AppendStep, HEAD_VERSION, ORIGIN_VERSION, PreparationService};
pub use step::{ContentId, PreparationActions, Step, StepDiff, StepId};
