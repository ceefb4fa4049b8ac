use anyhow::{Context, Result};
use argh::FromArgs;

use super::CliContext;
use crate::chain_rpc::{ChainRpc, Tokens};
use crate::util::*;
use crate::wallet::{Account, Creation, Wallet};

#[derive(FromArgs)]
/// Wallet and account management
#[argh(subcommand, name = "wallet")]
pub struct Cmd {
    #[argh(subcommand)]
    subcommand: SubCmd,
}

impl Cmd {
    pub async fn run(self, ctx: CliContext) -> Result<()> {
        match self.subcommand {
            SubCmd::Create(cmd) => cmd.run(ctx),
            SubCmd::Add(cmd) => cmd.run(ctx),
            SubCmd::Import(cmd) => cmd.run(ctx),
            SubCmd::List(cmd) => cmd.run(ctx),
            SubCmd::Show(cmd) => cmd.run(ctx),
            SubCmd::Select(cmd) => cmd.run(ctx),
            SubCmd::Balance(cmd) => cmd.run(ctx).await,
            SubCmd::Wipe(cmd) => cmd.run(ctx),
        }
    }
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum SubCmd {
    Create(CmdCreate),
    Add(CmdAdd),
    Import(CmdImport),
    List(CmdList),
    Show(CmdShow),
    Select(CmdSelect),
    Balance(CmdBalance),
    Wipe(CmdWipe),
}

#[derive(FromArgs)]
/// Creates a new wallet, or derives the next account once one exists
#[argh(subcommand, name = "create")]
struct CmdCreate {
    /// account name
    #[argh(positional)]
    name: String,
}

impl CmdCreate {
    fn run(self, ctx: CliContext) -> Result<()> {
        let wallet = ctx.wallet()?;

        let account = match wallet.create_or_add_account(&self.name)? {
            Creation::New {
                phrase,
                pending_name,
            } => {
                disclose_phrase(&phrase)?;
                wallet.complete_creation(&pending_name, &phrase)?
            }
            Creation::Derived(account) => account,
        };

        print_output(account_output(&account));
        Ok(())
    }
}

/// Shows the freshly generated phrase and waits for an acknowledgement.
/// This is the only time it is ever displayed.
fn disclose_phrase(phrase: &str) -> Result<()> {
    eprintln!(
        "{}",
        console::style("Master seed phrase, shown once. Save it in a secure location:")
            .yellow()
            .bold()
    );
    eprintln!();
    for (i, word) in phrase.split_whitespace().enumerate() {
        eprintln!("  {:>2}. {word}", i + 1);
    }
    eprintln!();

    if is_terminal() {
        let theme = &dialoguer::theme::ColorfulTheme::default();
        if !confirm(theme, false, "I have saved my seed phrase")? {
            anyhow::bail!("wallet creation aborted");
        }
    }
    Ok(())
}

#[derive(FromArgs)]
/// Derives the next account of an initialized wallet
#[argh(subcommand, name = "add")]
struct CmdAdd {
    /// account name
    #[argh(positional)]
    name: String,
}

impl CmdAdd {
    fn run(self, ctx: CliContext) -> Result<()> {
        let wallet = ctx.wallet()?;
        wallet.session().require_principal()?;
        anyhow::ensure!(
            wallet.is_initialized()?,
            "no wallet yet, run `wallet create` first"
        );

        let Creation::Derived(account) = wallet.create_or_add_account(&self.name)? else {
            anyhow::bail!("wallet state changed underneath, retry");
        };

        print_output(account_output(&account));
        Ok(())
    }
}

#[derive(FromArgs)]
/// Imports an existing wallet from its 12 word seed phrase
#[argh(subcommand, name = "import")]
struct CmdImport {
    /// account name
    #[argh(positional)]
    name: String,

    /// seed phrase or empty for input from stdin
    #[argh(positional)]
    phrase: Option<String>,
}

impl CmdImport {
    fn run(self, ctx: CliContext) -> Result<()> {
        let phrase = parse_optional_input(self.phrase)?;
        let phrase = normalize_phrase(&phrase);

        let account = ctx.wallet()?.import_account(&self.name, &phrase)?;
        print_output(account_output(&account));
        Ok(())
    }
}

fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(FromArgs)]
/// Lists all registered accounts
#[argh(subcommand, name = "list")]
struct CmdList {}

impl CmdList {
    fn run(self, ctx: CliContext) -> Result<()> {
        let accounts = ctx.wallet()?.accounts()?;
        let output = accounts.iter().map(account_output).collect::<Vec<_>>();
        print_output(serde_json::Value::Array(output));
        Ok(())
    }
}

#[derive(FromArgs)]
/// Shows one account
#[argh(subcommand, name = "show")]
struct CmdShow {
    /// account id or empty for the selected account
    #[argh(positional)]
    id: Option<String>,
}

impl CmdShow {
    fn run(self, ctx: CliContext) -> Result<()> {
        let account = resolve_account(&ctx.wallet()?, self.id)?;
        print_output(account_output(&account));
        Ok(())
    }
}

#[derive(FromArgs)]
/// Selects the account used by default
#[argh(subcommand, name = "select")]
struct CmdSelect {
    /// account id
    #[argh(positional)]
    id: String,
}

impl CmdSelect {
    fn run(self, ctx: CliContext) -> Result<()> {
        let account = ctx.wallet()?.select_account(&self.id)?;
        print_output(account_output(&account));
        Ok(())
    }
}

#[derive(FromArgs)]
/// Fetches chain balances for one account
#[argh(subcommand, name = "balance")]
struct CmdBalance {
    /// account id or empty for the selected account
    #[argh(positional)]
    id: Option<String>,
}

impl CmdBalance {
    async fn run(self, ctx: CliContext) -> Result<()> {
        let account = resolve_account(&ctx.wallet()?, self.id)?;

        let config = ctx.load_config()?;
        let rpc = ChainRpc::new(config.query_timeout())?;

        let (lamports, wei) = tokio::try_join!(
            rpc.solana_balance(&config.solana_rpc, &account.solana_address),
            rpc.ethereum_balance(&config.ethereum_rpc, &account.ethereum_address),
        )?;

        print_output(serde_json::json!({
            "id": account.id,
            "name": account.name,
            "solana": {
                "address": account.solana_address,
                "balance": Tokens::<9>(lamports).to_string(),
            },
            "ethereum": {
                "address": account.ethereum_address,
                "balance": Tokens::<18>(wei).to_string(),
            },
        }));
        Ok(())
    }
}

#[derive(FromArgs)]
/// Erases the master seed phrase and all accounts
#[argh(subcommand, name = "wipe")]
struct CmdWipe {
    /// skip the confirmation prompt
    #[argh(switch)]
    force: bool,
}

impl CmdWipe {
    fn run(self, ctx: CliContext) -> Result<()> {
        if !self.force {
            anyhow::ensure!(is_terminal(), "pass --force to wipe without a prompt");

            let theme = &dialoguer::theme::ColorfulTheme::default();
            if !confirm(
                theme,
                false,
                "Erase the master seed phrase and all accounts? This cannot be undone",
            )? {
                return Ok(());
            }
        }

        ctx.wallet()?.wipe()?;
        eprintln!("Wallet erased {}", note("the session is kept"));
        Ok(())
    }
}

fn resolve_account(wallet: &Wallet, id: Option<String>) -> Result<Account> {
    match id {
        Some(id) => wallet
            .account(&id)?
            .with_context(|| format!("unknown account `{id}`")),
        None => wallet
            .selected_account()?
            .context("no account selected, pass an account id"),
    }
}

fn account_output(account: &Account) -> serde_json::Value {
    serde_json::json!({
        "id": account.id,
        "name": account.name,
        "solana_address": account.solana_address,
        "ethereum_address": account.ethereum_address,
        "index": account.index,
    })
}
