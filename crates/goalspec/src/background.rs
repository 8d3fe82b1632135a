use std::path::Path;

use crate::{GroundedDomain, Result, SpecGoalError};

/// Background knowledge for the specification engine.
///
/// The domain's static facts, an empty separator line, then the lines of the
/// optional extra file.
pub fn load_background<D: GroundedDomain + ?Sized>(
    domain: &D,
    extra: Option<&Path>,
) -> Result<Vec<String>> {
    let mut lines = domain.background_facts();
    lines.push(String::new());

    if let Some(path) = extra {
        let content = std::fs::read_to_string(path).map_err(|source| SpecGoalError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        lines.extend(content.lines().map(str::to_string));
    }
    Ok(lines)
}
