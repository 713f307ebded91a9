use std::path::{Path, PathBuf};

const HOME_ENV: &str = "A3S_BRIDGE_HOME";

/// Returns the base directory for bridge data.
///
/// Uses `$A3S_BRIDGE_HOME` if set, otherwise defaults to `~/.a3s/bridge`.
pub fn bridge_home() -> PathBuf {
    resolve_home(std::env::var_os(HOME_ENV).map(PathBuf::from), dirs::home_dir())
}

fn resolve_home(override_dir: Option<PathBuf>, user_home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.as_os_str().is_empty()) {
        return dir;
    }
    user_home
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".a3s")
        .join("bridge")
}

/// Returns the path to the user configuration file.
pub fn config_path() -> PathBuf {
    config_path_in(&bridge_home())
}

/// Returns the default path of the project registry file.
pub fn projects_path() -> PathBuf {
    projects_path_in(&bridge_home())
}

fn config_path_in(home: &Path) -> PathBuf {
    home.join("config.toml")
}

fn projects_path_in(home: &Path) -> PathBuf {
    home.join("projects.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_default() {
        let home = resolve_home(None, Some(PathBuf::from("/home/dev")));
        assert_eq!(home, PathBuf::from("/home/dev/.a3s/bridge"));
    }

    #[test]
    fn test_home_override() {
        let home = resolve_home(
            Some(PathBuf::from("/tmp/test-bridge")),
            Some(PathBuf::from("/home/dev")),
        );
        assert_eq!(home, PathBuf::from("/tmp/test-bridge"));

        // An empty override is ignored
        let home = resolve_home(Some(PathBuf::new()), Some(PathBuf::from("/home/dev")));
        assert_eq!(home, PathBuf::from("/home/dev/.a3s/bridge"));
    }

    #[test]
    fn test_home_without_user_dir() {
        assert_eq!(resolve_home(None, None), PathBuf::from("./.a3s/bridge"));
    }

    #[test]
    fn test_file_paths() {
        let home = PathBuf::from("/tmp/test-bridge");
        assert_eq!(
            config_path_in(&home),
            PathBuf::from("/tmp/test-bridge/config.toml")
        );
        assert_eq!(
            projects_path_in(&home),
            PathBuf::from("/tmp/test-bridge/projects.json")
        );
    }
}
