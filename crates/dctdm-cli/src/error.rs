use thiserror::Error;

/// Ambient CLI error: either a library failure or an I/O problem reading or
/// writing the files named on the command line.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Codec(#[from] dctdm_core::DctdmError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
