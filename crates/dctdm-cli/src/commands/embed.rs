use std::fs;
use std::path::PathBuf;

use clap::Args;
use dctdm_core::{EmbedConfig, Identity, Transform};
use dctdm_crypto::PassphraseTransform;

use crate::cli::{resolve_password, ConfigArgs};
use crate::error::CliResult;

/// Hides a message or file's bytes in a baseline JPEG's AC coefficients
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Cover JPEG, used read-only
    #[arg(short = 'i', long = "in", value_name = "cover.jpg", required = true)]
    pub cover: PathBuf,

    /// Stego JPEG to write
    #[arg(short = 'o', long = "out", value_name = "stego.jpg", required = true)]
    pub output: PathBuf,

    /// A text message to hide
    #[arg(
        short,
        long,
        value_name = "text",
        required_unless_present = "data"
    )]
    pub message: Option<String>,

    /// A file whose bytes are hidden instead of a text message
    #[arg(long, value_name = "file", required_unless_present = "message")]
    pub data: Option<PathBuf>,

    /// Encrypt the payload with a passphrase; with no value, prompts interactively
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub password: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl EmbedArgs {
    pub fn run(self) -> CliResult<()> {
        let cover = fs::read(&self.cover)?;
        let payload = match self.data {
            Some(path) => fs::read(path)?,
            None => self.message.unwrap_or_default().into_bytes(),
        };

        let password = resolve_password(self.password);
        let transform: Box<dyn Transform> = match password {
            Some(passphrase) => Box::new(PassphraseTransform::new(passphrase)),
            None => Box::new(Identity),
        };

        let config: EmbedConfig = self.config.into();
        let stego = dctdm_core::embed_in_jpeg(&cover, &payload, &config, transform.as_ref(), None)?;
        fs::write(self.output, stego)?;
        Ok(())
    }
}
