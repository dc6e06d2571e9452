//! Project-root discovery: the start directory or the nearest ancestor in
//! which every marker path exists.

use std::path::{Path, PathBuf};

use reqtrace_config::ROOT_MARKERS;

/// Search `start` and its ancestors for the first directory containing all
/// root markers. `None` means the caller should fall back to the working
/// directory.
pub(crate) fn discover(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| ROOT_MARKERS.iter().all(|marker| dir.join(marker).exists()))
        .map(Path::to_path_buf)
}
