use anyhow::Result;

use crate::util::print_error;

mod chain_rpc;
mod cli;
mod config;
mod crypto;
mod dirs;
mod session;
mod storage;
mod util;
mod wallet;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt::init();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            print_error(format!("{e:?}"));
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    argh::from_env::<cli::App>().run().await
}
