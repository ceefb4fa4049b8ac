use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use argh::FromArgs;

use crate::config::AppConfig;
use crate::dirs::ProjectDirs;
use crate::session::Session;
use crate::storage::FileStore;
use crate::wallet::Wallet;

pub mod init;
pub mod seed;
pub mod session;
pub mod wallet;

/// All-in-one HD wallet management tool
#[derive(FromArgs)]
pub struct App {
    #[argh(subcommand)]
    command: Command,

    /// path to the root directory
    #[argh(option, default = "ProjectDirs::default_root_dir()")]
    root: PathBuf,
}

impl App {
    pub async fn run(self) -> Result<()> {
        tracing::debug!("root dir {:?}", self.root);

        let ctx = CliContext {
            dirs: ProjectDirs::new(self.root),
        };

        match self.command {
            Command::Init(cmd) => cmd.run(ctx),
            Command::Wallet(cmd) => cmd.run(ctx).await,
            Command::Seed(cmd) => cmd.run(),
            Command::Session(cmd) => cmd.run(ctx),
        }
    }
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Init(init::Cmd),
    Wallet(wallet::Cmd),
    Seed(seed::Cmd),
    Session(session::Cmd),
}

pub struct CliContext {
    dirs: ProjectDirs,
}

impl CliContext {
    pub fn load_config(&self) -> Result<AppConfig> {
        AppConfig::load(&self.dirs.app_config)
    }

    pub fn dirs(&self) -> &ProjectDirs {
        &self.dirs
    }

    pub fn wallet(&self) -> Result<Wallet> {
        Wallet::new(self.store()?)
    }

    pub fn session(&self) -> Result<Session> {
        Ok(Session::new(self.store()?))
    }

    fn store(&self) -> Result<Arc<FileStore>> {
        Ok(Arc::new(FileStore::new(&self.dirs.store_dir)?))
    }
}
