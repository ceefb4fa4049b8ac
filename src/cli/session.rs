use anyhow::{Context, Result};
use argh::FromArgs;

use super::CliContext;
use crate::session::Principal;
use crate::util::*;

#[derive(FromArgs)]
/// Session management
#[argh(subcommand, name = "session")]
pub struct Cmd {
    #[argh(subcommand)]
    subcommand: SubCmd,
}

impl Cmd {
    pub fn run(self, ctx: CliContext) -> Result<()> {
        match self.subcommand {
            SubCmd::Login(cmd) => cmd.run(ctx),
            SubCmd::Logout(cmd) => cmd.run(ctx),
            SubCmd::Whoami(cmd) => cmd.run(ctx),
        }
    }
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum SubCmd {
    Login(CmdLogin),
    Logout(CmdLogout),
    Whoami(CmdWhoami),
}

#[derive(FromArgs)]
/// Starts a session for the given principal
#[argh(subcommand, name = "login")]
struct CmdLogin {
    /// principal name
    #[argh(positional)]
    principal: String,
}

impl CmdLogin {
    fn run(self, ctx: CliContext) -> Result<()> {
        let principal = self.principal.trim();
        anyhow::ensure!(!principal.is_empty(), "principal must not be empty");

        let principal = Principal(principal.to_owned());
        ctx.session()?.login(principal.clone())?;
        eprintln!("Logged in as `{principal}`");
        Ok(())
    }
}

#[derive(FromArgs)]
/// Ends the current session
#[argh(subcommand, name = "logout")]
struct CmdLogout {}

impl CmdLogout {
    fn run(self, ctx: CliContext) -> Result<()> {
        ctx.session()?.logout()?;
        eprintln!(
            "Logged out {}",
            note("stored wallet data is kept, use `wallet wipe` to erase it")
        );
        Ok(())
    }
}

#[derive(FromArgs)]
/// Prints the current principal
#[argh(subcommand, name = "whoami")]
struct CmdWhoami {}

impl CmdWhoami {
    fn run(self, ctx: CliContext) -> Result<()> {
        let principal = ctx
            .session()?
            .current_principal()?
            .context("no active session")?;
        print_output(principal);
        Ok(())
    }
}
