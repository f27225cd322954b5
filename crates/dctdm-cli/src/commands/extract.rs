use std::fs;
use std::path::PathBuf;

use clap::Args;
use dctdm_core::{EmbedConfig, Identity, Transform};
use dctdm_crypto::PassphraseTransform;

use crate::cli::{resolve_password, ConfigArgs};
use crate::error::CliResult;

/// Recovers a hidden payload from a stego JPEG's AC coefficients
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Stego JPEG, used read-only
    #[arg(short = 'i', long = "in", value_name = "stego.jpg", required = true)]
    pub stego: PathBuf,

    /// File to write the recovered payload bytes to
    #[arg(short = 'o', long = "out", value_name = "file", required = true)]
    pub output: PathBuf,

    /// Decrypt the payload with a passphrase; with no value, prompts interactively
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub password: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl ExtractArgs {
    pub fn run(self) -> CliResult<()> {
        let stego = fs::read(&self.stego)?;

        let password = resolve_password(self.password);
        let transform: Box<dyn Transform> = match password {
            Some(passphrase) => Box::new(PassphraseTransform::new(passphrase)),
            None => Box::new(Identity),
        };

        let config: EmbedConfig = self.config.into();
        let payload = dctdm_core::extract_from_jpeg(&stego, &config, transform.as_ref(), None)?;
        fs::write(self.output, payload)?;
        Ok(())
    }
}
