use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "agriweather",
    version,
    about = "Crop-weather suitability advisor for messaging webhooks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the messaging webhook server (default)
    Serve {
        /// Override the configured bind address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Chat with the bot from the terminal
    Chat {
        /// Sender identity for the local session
        #[arg(short, long, default_value = "local")]
        sender: String,
    },
    /// Check one crop stage against the live forecast for a city
    Evaluate {
        #[arg(long)]
        crop: String,
        /// sowing/harvesting (or s/h)
        #[arg(long)]
        stage: String,
        #[arg(long)]
        city: String,
        /// Month to evaluate against (1-12), defaults to the current month
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
    /// Validate config and crop data, and test API connections
    Check,
    /// Run interactive setup
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_evaluate_arguments() {
        let cli = Cli::try_parse_from([
            "agriweather", "-v", "evaluate", "--crop", "rice", "--stage", "s", "--city", "Kanpur",
            "--month", "7",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Some(Commands::Evaluate { crop, month, .. }) => {
                assert_eq!(crop, "rice");
                assert_eq!(month, Some(7));
            }
            _ => panic!("expected evaluate command"),
        }
    }

    #[test]
    fn rejects_out_of_range_month() {
        let result = Cli::try_parse_from([
            "agriweather", "evaluate", "--crop", "rice", "--stage", "s", "--city", "Kanpur",
            "--month", "13",
        ]);
        assert!(result.is_err());
    }
}
