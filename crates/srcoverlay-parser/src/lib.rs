//! srcoverlay Parser
//!
//! Regex-driven scanning of C/C++ override files.
//!
//! ## Modules
//!
//! - `comments` - Comment stripping
//! - `defines` - `#define`/`#undef` extraction and symbol occurrence scanning
//! - `includes` - `#include` directive recognition
//! - `walk` - Override tree discovery

pub mod comments;
pub mod defines;
pub mod includes;
pub mod walk;

pub use comments::strip_comments;
pub use defines::{find_occurrences, RegexDefineExtractor};
pub use includes::IncludeDirective;
pub use walk::collect_override_paths;

use srcoverlay_core::MacroMatch;

/// Extractor of macro redefinitions
///
/// Implementations must return matches in file order.
pub trait DefineExtractor: Send + Sync {
    /// Extract every `#define` redefinition from comment-stripped text
    fn extract(&self, text: &str) -> Vec<MacroMatch>;

    /// Get extractor name
    fn name(&self) -> &str;
}

/// Get the default extractor
pub fn get_extractor() -> Box<dyn DefineExtractor> {
    Box::new(RegexDefineExtractor::new())
}
