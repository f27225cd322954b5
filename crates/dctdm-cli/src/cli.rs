use clap::{Args, Parser, Subcommand};
use dctdm_core::EmbedConfig;

use crate::commands::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Embed(embed::EmbedArgs),
    Extract(extract::ExtractArgs),
    Capacity(capacity::CapacityArgs),
}

/// DCTDM tuning knobs shared by every subcommand; embed and extract must be
/// invoked with the same values or recovery will fail silently-wrong.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Step size controlling embedding strength.
    #[arg(long, default_value = "10")]
    pub delta: u32,

    /// Number of AC zigzag positions used per luma block (pairs = this / 2).
    #[arg(long = "pairs-per-block", default_value = "8")]
    pub pairs_per_block: usize,

    /// Component id to target; defaults to luminance.
    #[arg(long)]
    pub component: Option<u8>,

    /// Skip pairs where both coefficients are already zero.
    #[arg(long = "skip-zero-pairs")]
    pub skip_zero_pairs: bool,
}

impl From<ConfigArgs> for EmbedConfig {
    fn from(args: ConfigArgs) -> Self {
        EmbedConfig {
            delta: args.delta,
            pairs_per_block: args.pairs_per_block,
            component: args.component,
            skip_zero_pairs: args.skip_zero_pairs,
        }
    }
}

/// Resolves a `--password` flag: absent means no encryption, present with no
/// value prompts interactively, present with a value uses it directly.
pub fn resolve_password(password: Option<String>) -> Option<String> {
    match password {
        None => None,
        Some(value) if value.is_empty() => Some(ask_for_password()),
        Some(value) => Some(value),
    }
}

fn ask_for_password() -> String {
    dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .expect("reading a password from the terminal should not fail")
}
