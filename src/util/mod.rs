pub use self::cli::*;

mod cli;
