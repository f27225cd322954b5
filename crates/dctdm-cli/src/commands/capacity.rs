use std::fs;
use std::path::PathBuf;

use clap::Args;
use dctdm_core::EmbedConfig;

use crate::cli::ConfigArgs;
use crate::error::CliResult;

/// Reports the usable payload capacity, in bytes, of a cover JPEG
#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// Cover JPEG, used read-only
    #[arg(short = 'i', long = "in", value_name = "cover.jpg", required = true)]
    pub cover: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl CapacityArgs {
    pub fn run(self) -> CliResult<()> {
        let cover = fs::read(&self.cover)?;
        let config: EmbedConfig = self.config.into();
        let bytes = dctdm_core::jpeg_capacity(&cover, &config)?;
        println!("{bytes}");
        Ok(())
    }
}
