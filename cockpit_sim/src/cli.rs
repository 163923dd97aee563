use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

/// Cockpit panel simulator: drives a panel of VR cockpit controls with a
/// scripted pair of tracked hands and logs every state change.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/master_arm.toml")]
    pub scenario: PathBuf,

    /// Override the scenario's run length, in seconds.
    #[arg(short, long)]
    pub duration: Option<f32>,

    /// Override the scenario's jitter seed.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_optional() {
        let cli = Cli::parse_from(["cockpit"]);
        assert_eq!(cli.scenario, PathBuf::from("assets/scenarios/master_arm.toml"));
        assert!(cli.duration.is_none());
        assert!(cli.seed.is_none());

        let cli = Cli::parse_from(["cockpit", "-s", "other.toml", "--duration", "2.5", "--seed", "9"]);
        assert_eq!(cli.scenario, PathBuf::from("other.toml"));
        assert_eq!(cli.duration, Some(2.5));
        assert_eq!(cli.seed, Some(9));
    }
}
