use std::path::{Path, PathBuf};

const ENV: &str = "WALLETKEEPER_ROOT";

pub struct ProjectDirs {
    pub app_config: PathBuf,
    pub store_dir: PathBuf,
    pub root: PathBuf,
}

impl ProjectDirs {
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Self {
        let root = root_dir.as_ref().to_path_buf();

        Self {
            app_config: root.join("config.toml"),
            store_dir: root.join("store"),
            root,
        }
    }

    pub fn default_root_dir() -> PathBuf {
        if let Ok(path) = std::env::var(ENV) {
            return PathBuf::from(path);
        }

        const DEFAULT_ROOT_DIR: &str = ".walletkeeper";

        match home::home_dir() {
            Some(home) => home.join(DEFAULT_ROOT_DIR),
            None => {
                panic!("No valid home directory path could be retrieved from the operating system")
            }
        }
    }
}
