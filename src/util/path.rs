use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR` and `${VAR}` in a path.
///
/// Paths that cannot be expanded (unset variables, non-UTF-8) are returned unchanged.
pub fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => shellexpand::full(s)
            .map(|expanded| PathBuf::from(expanded.into_owned()))
            .unwrap_or_else(|_| path.to_path_buf()),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tilde_when_expanding_then_uses_home() {
        let home = std::env::var("HOME").expect("HOME should be set");
        let expanded = expand_path(Path::new("~/conf/app.yaml"));
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with("conf/app.yaml"));
    }

    #[test]
    fn given_unset_variable_when_expanding_then_returns_input() {
        let path = Path::new("$LCT_SURELY_UNSET_VARIABLE/app.yaml");
        assert_eq!(expand_path(path), path.to_path_buf());
    }
}
