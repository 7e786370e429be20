//! Utility functions for path manipulation

use std::path::{Path, PathBuf};

/// Expand a leading `~` to the current user's home directory
///
/// Only the bare `~` and `~/...` forms are expanded. Anything else, including
/// `~otheruser/...`, is returned unchanged, as is every path when the home
/// directory cannot be determined.
///
/// # Examples
///
/// ```
/// use icesat2_hist::utils::expand_home;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_home("/data/atl06"), PathBuf::from("/data/atl06"));
/// ```
pub fn expand_home(raw: &str) -> PathBuf {
    expand_home_with(raw, dirs::home_dir().as_deref())
}

fn expand_home_with(raw: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(raw);
    };

    if raw == "~" {
        return home.to_path_buf();
    }

    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}
