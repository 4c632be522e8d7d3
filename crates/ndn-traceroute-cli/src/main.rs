//! CLI for ndn-traceroute.

mod runner;

use clap::error::ErrorKind;
use clap::Parser;
use ndn_traceroute_core::tlv::Name;
use ndn_traceroute_core::{
    TracerouteConfig, TracerouteError, TracerouteParams, DEFAULT_FACE_URI,
    DEFAULT_INTEREST_LIFETIME_MS, DEFAULT_MAX_HOP_LIMIT,
};
use std::process::ExitCode;
use std::time::Duration;

/// NDN traceroute: discover the forwarders on the path to a name.
#[derive(Parser, Debug)]
#[command(name = "traceroute-client")]
#[command(version)]
#[command(about = "NDN traceroute: discover the forwarders on the path to a name")]
pub struct Args {
    /// Name to trace, e.g. /example/test.
    pub target: String,

    /// Highest HopLimit to probe (1 to 255).
    #[arg(default_value_t = DEFAULT_MAX_HOP_LIMIT, value_parser = parse_max_hop_limit)]
    pub max_hop_limit: u8,

    /// Forwarder face URI.
    #[arg(long, env = "NDN_CLIENT_TRANSPORT", default_value = DEFAULT_FACE_URI)]
    pub face: String,

    /// Interest lifetime in milliseconds.
    #[arg(long, default_value_t = DEFAULT_INTEREST_LIFETIME_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub lifetime: u64,

    /// Print a JSON report instead of per-hop lines.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_max_hop_limit(s: &str) -> Result<u8, String> {
    TracerouteParams::parse_max_hop_limit(s).map_err(|e| e.to_string())
}

impl Args {
    /// Convert CLI args to TracerouteConfig.
    fn to_config(&self) -> Result<TracerouteConfig, String> {
        let target: Name = self
            .target
            .parse()
            .map_err(|e| format!("Invalid target name {}: {}", self.target, e))?;

        let config = TracerouteConfig {
            target,
            params: TracerouteParams {
                max_hop_limit: self.max_hop_limit,
                interest_lifetime: Duration::from_millis(self.lifetime),
            },
            face_uri: self.face.clone(),
        };
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(if args.verbose { "debug" } else { "info" })
        .init();

    let config = match args.to_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!(
        target = %config.target,
        max_hop_limit = config.params.max_hop_limit,
        face = %config.face_uri,
        max_duration_ms = config.params.max_duration().as_millis() as u64,
        "Starting traceroute"
    );

    let result = tokio::select! {
        result = runner::run_traceroute(&config, args.json) => result,
        _ = tokio::signal::ctrl_c() => Err(TracerouteError::Cancelled),
    };

    match result {
        Ok(report) => {
            tracing::debug!(
                destination_reached = report.destination_reached(),
                probes_sent = report.probes_sent,
                "Traceroute finished"
            );
            if args.json {
                match report.to_json() {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize results: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Traceroute failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["traceroute-client", "/example/test"]).unwrap();
        assert_eq!(args.max_hop_limit, 30);
        assert_eq!(args.lifetime, 4000);
        assert!(!args.json);

        let config = args.to_config().unwrap();
        assert_eq!(config.target.to_string(), "/example/test");
        assert_eq!(config.params.interest_lifetime, Duration::from_millis(4000));
    }

    #[test]
    fn test_explicit_max_hop_limit() {
        let args = Args::try_parse_from(["traceroute-client", "/example/test", "5"]).unwrap();
        assert_eq!(args.max_hop_limit, 5);
    }

    #[test]
    fn test_rejects_bad_max_hop_limit() {
        for bad in ["0", "256", "abc", "-3"] {
            assert!(
                Args::try_parse_from(["traceroute-client", "/example/test", bad]).is_err(),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_missing_target_is_usage_error() {
        let err = Args::try_parse_from(["traceroute-client"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_root_name_is_rejected() {
        let args = Args::try_parse_from(["traceroute-client", "/"]).unwrap();
        assert!(args.to_config().is_err());
    }

    #[test]
    fn test_face_option() {
        let args = Args::try_parse_from([
            "traceroute-client",
            "--face",
            "tcp4://127.0.0.1:6363",
            "/example/test",
        ])
        .unwrap();
        assert_eq!(args.to_config().unwrap().face_uri, "tcp4://127.0.0.1:6363");
    }
}
