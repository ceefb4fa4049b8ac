use anyhow::{Context, Result};
use argh::FromArgs;

use super::CliContext;
use crate::config::AppConfig;

#[derive(FromArgs)]
/// Prepares the root directory and a default config
#[argh(subcommand, name = "init")]
pub struct Cmd {
    /// overwrite an existing config
    #[argh(switch)]
    force: bool,
}

impl Cmd {
    pub fn run(self, ctx: CliContext) -> Result<()> {
        let dirs = ctx.dirs();

        std::fs::create_dir_all(&dirs.root).context("failed to create root directory")?;

        if dirs.app_config.exists() && !self.force {
            eprintln!("Config already exists at {:?}", dirs.app_config);
            return Ok(());
        }

        AppConfig::default().store(&dirs.app_config)?;
        eprintln!("Config created at {:?}", dirs.app_config);
        Ok(())
    }
}
