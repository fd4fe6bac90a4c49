//! Override tree discovery

use regex::Regex;
use srcoverlay_core::Result;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Collect override files under `root` as `/`-separated relative paths
///
/// `include` takes precedence over `exclude`: a path must match `include`
/// (when given) and must not match `exclude` (when given). Symlinks are
/// followed, so linked overrides are listed under their link path.
pub fn collect_override_paths(
    root: &Path,
    include: Option<&Regex>,
    exclude: Option<&Regex>,
) -> Result<Vec<String>> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let normalized = relative.to_string_lossy().replace('\\', "/");

        if let Some(re) = include {
            if !re.is_match(&normalized) {
                continue;
            }
        }
        if let Some(re) = exclude {
            if re.is_match(&normalized) {
                debug!("Excluded {}", normalized);
                continue;
            }
        }
        paths.push(normalized);
    }

    info!("Found {} overrides under {}", paths.len(), root.display());
    Ok(paths)
}
