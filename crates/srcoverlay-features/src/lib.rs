//! srcoverlay Features
//!
//! Loads JSON feature-definition files into a single table and lets
//! registered mutators splice vendor entries into it before the table is
//! compiled.
//!
//! ## Modules
//!
//! - `jsonc` - JSON with comments
//! - `compiler` - Feature table loading and the mutator hook
//! - `vendor` - Vendor feature extensions and extension ids

pub mod compiler;
pub mod jsonc;
pub mod vendor;

pub use compiler::{FeatureCompiler, FeatureMutator, FeatureTable};
pub use vendor::{ExtensionIds, VendorFeatureExtensions, EXTENSION_IDS};
