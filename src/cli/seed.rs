use anyhow::Result;
use argh::FromArgs;

use crate::crypto::{self, Chain};
use crate::util::*;

#[derive(FromArgs)]
/// Seed phrase utilities
#[argh(subcommand, name = "seed")]
pub struct Cmd {
    #[argh(subcommand)]
    subcommand: SubCmd,
}

impl Cmd {
    pub fn run(self) -> Result<()> {
        match self.subcommand {
            SubCmd::Generate(cmd) => cmd.run(),
            SubCmd::Derive(cmd) => cmd.run(),
        }
    }
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum SubCmd {
    Generate(CmdGenerate),
    Derive(CmdDerive),
}

#[derive(FromArgs)]
/// Generates a new 12 word seed phrase
#[argh(subcommand, name = "generate")]
struct CmdGenerate {}

impl CmdGenerate {
    fn run(self) -> Result<()> {
        print_output(crypto::generate_phrase());
        Ok(())
    }
}

#[derive(FromArgs)]
/// Derives a key pair from a seed phrase without touching the wallet
#[argh(subcommand, name = "derive")]
struct CmdDerive {
    /// seed phrase or empty for input from stdin
    #[argh(positional)]
    phrase: Option<String>,

    /// chain to derive for ("solana" or "ethereum")
    #[argh(option, short = 'c', default = "Chain::Solana")]
    chain: Chain,

    /// account index
    #[argh(option, short = 'i', default = "0")]
    index: u32,
}

impl CmdDerive {
    fn run(self) -> Result<()> {
        let phrase = parse_optional_input(self.phrase)?;
        let seed = crypto::phrase_to_seed(phrase.trim())?;
        let key_pair = self.chain.derive_key_pair(&seed, self.index)?;

        print_output(serde_json::json!({
            "chain": self.chain.name(),
            "path": self.chain.derivation_path(self.index),
            "address": key_pair.address,
            "secret": hex::encode(key_pair.secret),
        }));
        Ok(())
    }
}
