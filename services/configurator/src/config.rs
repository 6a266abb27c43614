//! Command-line and environment configuration.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "configurator")]
#[command(about = "Interactive tuning server for heatmap render parameters")]
pub struct Args {
    /// CSV file of `lat,lng[,weight]` points to render
    pub points: PathBuf,

    /// Listen address
    #[arg(short, long, env = "HEATMAP_LISTEN", default_value = "0.0.0.0:2100")]
    pub listen: String,

    /// Log level, used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["configurator", "points.csv"]).unwrap();
        assert_eq!(args.points, PathBuf::from("points.csv"));
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_points_file_required() {
        assert!(Args::try_parse_from(["configurator"]).is_err());
    }
}
