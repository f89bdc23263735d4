//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use denpush_deploy::LoginCredentials;
use denpush_pack::{MAX_LEVEL, MIN_LEVEL};

#[derive(Debug, Parser)]
#[command(name = "denpush", version, about, long_about = None, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Creates a tar archive from a source directory.
    Tar(TarArgs),
    /// Packs files into a tar archive and then compresses it with Zstandard.
    Pack(PackArgs),
    /// Packs and compresses files, then uploads the result to a web API.
    Upload(UploadArgs),
}

#[derive(Debug, Args)]
pub struct TarArgs {
    /// The output tar file name.
    pub destination: PathBuf,
    /// The source directory to tar. Defaults to the current directory.
    pub source: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PackArgs {
    /// The output file name.
    pub destination: PathBuf,
    /// The source directory to pack. Defaults to the current directory.
    pub source: Option<PathBuf>,
    /// Compression level from 1 (lowest) to 100 (highest). Default is 100.
    #[arg(short = 'c', long = "compression", value_parser = level_parser())]
    pub compression: Option<u8>,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// The URL of the web API the artifact is uploaded to.
    pub url: String,
    /// The source directory to pack. Defaults to the current directory.
    pub source: Option<PathBuf>,
    /// Authentication endpoint path where credentials are exchanged for a token.
    #[arg(short = 'l', long)]
    pub login: Option<String>,
    /// Username for API authentication.
    #[arg(short = 'u', long)]
    pub username: Option<String>,
    /// Password for API authentication.
    #[arg(short = 'p', long)]
    pub password: Option<String>,
    /// Compression level from 1 (lowest) to 100 (highest). Default is 100.
    #[arg(short = 'c', long = "compression", value_parser = level_parser())]
    pub compression: Option<u8>,
    /// Version of the application binaries, if the web API requires one.
    #[arg(short = 'v', long = "app-version")]
    pub app_version: Option<String>,
}

fn level_parser() -> clap::builder::RangedI64ValueParser<u8> {
    clap::value_parser!(u8).range(i64::from(MIN_LEVEL)..=i64::from(MAX_LEVEL))
}

impl UploadArgs {
    /// Login settings, when a login endpoint was given.
    ///
    /// A login endpoint without both a username and a password is an error.
    pub fn credentials(&self) -> anyhow::Result<Option<LoginCredentials>> {
        let Some(endpoint) = non_empty(&self.login) else {
            return Ok(None);
        };

        match (non_empty(&self.username), non_empty(&self.password)) {
            (Some(username), Some(password)) => Ok(Some(LoginCredentials {
                endpoint: endpoint.to_string(),
                username: username.to_string(),
                password: password.to_string(),
            })),
            _ => anyhow::bail!(
                "you need to provide username and password for login enabled web APIs"
            ),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
