//! [`Args`] definitions.

use clap::Parser;

/// Server tracking product requests of unhoused people.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
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
    fn config_path() {
        let args = Args::try_parse_from(["app"]).unwrap();
        assert_eq!(args.config, "config.toml");

        let args = Args::try_parse_from(["app", "-c", "prod.toml"]).unwrap();
        assert_eq!(args.config, "prod.toml");

        assert!(Args::try_parse_from(["app", "--unknown"]).is_err());
    }
}
