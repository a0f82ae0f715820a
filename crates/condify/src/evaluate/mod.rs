//! Deciding which requirements apply to a concrete environment.
//!
//! Two evaluators exist:
//!
//! - [`host`] filters *raw* requirement lines against the running machine,
//!   delegating marker semantics to `pep508_rs`. Used at install time.
//! - [`selector`] filters *translated* lines by evaluating their `# [...]`
//!   selectors for an explicit Python version and conda platform.

pub mod host;
pub mod selector;

pub use host::{HostEnvironment, MarkerError, evaluate_requirements};
pub use selector::{Platform, SelectorError, SelectorEvaluator, split_selector};
