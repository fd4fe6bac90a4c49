//! Include consistency checks
//!
//! An override must include its original through a `src/`- or
//! `../gen/`-prefixed path equal to its own relative path, never through a
//! `../`-relative path.

use srcoverlay_core::{Diagnostic, DiagnosticKind, DiagnosticSink};
use srcoverlay_parser::IncludeDirective;

/// Overrides under this prefix may include other `src/` files
const V8_SRC_PREFIX: &str = "v8/src";

/// Check the include lines of an override file
///
/// `content` is the raw file content; comments are not stripped.
pub fn check_includes(override_path: &str, content: &str, sink: &mut dyn DiagnosticSink) -> usize {
    let normalized = override_path.replace('\\', "/");
    let file_name = normalized.rsplit('/').next().unwrap_or(&normalized);
    let mut error_count = 0;

    for line in content.lines() {
        let Some(include) = IncludeDirective::parse(line) else {
            continue;
        };

        match include {
            IncludeDirective::SrcPrefixed(target) => {
                if target == normalized || normalized.starts_with(V8_SRC_PREFIX) {
                    continue;
                }
                sink.emit(
                    Diagnostic::new(
                        DiagnosticKind::UnexpectedSrcInclude,
                        override_path,
                        format!(
                            "{} uses a src/-prefixed include that doesn't point to the expected file:",
                            override_path
                        ),
                    )
                    .with_note(format!("Include: {}", line))
                    .with_note(format!("Expected include target: src/{}", normalized)),
                );
                error_count += 1;
            }
            IncludeDirective::GenPrefixed(target) => {
                if target == normalized {
                    continue;
                }
                sink.emit(
                    Diagnostic::new(
                        DiagnosticKind::UnexpectedGenInclude,
                        override_path,
                        format!(
                            "{} uses a ../gen/-prefixed include that doesn't point to the expected file:",
                            override_path
                        ),
                    )
                    .with_note(format!("Include: {}", line))
                    .with_note(format!("Expected include target: ../gen/{}", normalized)),
                );
                error_count += 1;
            }
            IncludeDirective::Quoted(_) => {
                if !include.is_relative_to(file_name) {
                    continue;
                }
                sink.emit(
                    Diagnostic::new(
                        DiagnosticKind::RelativeInclude,
                        override_path,
                        format!("{} uses a relative include:", override_path),
                    )
                    .with_note(line.to_string())
                    .with_note("Switch to using a src/-prefixed include instead."),
                );
                error_count += 1;
            }
        }
    }

    error_count
}
