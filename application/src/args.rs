//! [`Args`] definitions.

use clap::Parser;

#[cfg(doc)]
use crate::Config;

/// Server of the household finance and small business tracker.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the [`Config`] file.
    ///
    /// A missing file is not an error: the environment and the defaults are
    /// used instead.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::Args;

    #[test]
    fn config_path_defaults_to_toml_file() {
        let args = Args::try_parse_from(["application"]).unwrap();

        assert_eq!(args.config, "config.toml");
    }

    #[test]
    fn config_path_is_overridable() {
        for flag in ["-c", "--config"] {
            let args =
                Args::try_parse_from(["application", flag, "prod.toml"])
                    .unwrap();

            assert_eq!(args.config, "prod.toml");
        }
    }
}
