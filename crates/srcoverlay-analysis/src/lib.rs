//! srcoverlay Analysis
//!
//! Consistency checks for an overrides directory that shadows files of an
//! upstream source tree:
//! - Macro redefinitions must be undone and must target upstream symbols
//! - Includes of the original must use the `src/` or `../gen/` form
//! - Exclusion entries must still point at existing files and symbols
//! - Every override must have an original

pub mod exclusions;
pub mod includes;
pub mod overrides;
pub mod validator;

pub use exclusions::validate_exclusions;
pub use includes::check_includes;
pub use overrides::{generated_build_dir, FileFailure, OverrideChecker, OverrideSets, TreeOutcome};
pub use validator::OverrideValidator;

#[cfg(test)]
mod tests;
