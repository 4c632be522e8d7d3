//! Traceroute responder binary.

use clap::error::ErrorKind;
use clap::Parser;
use ndn_traceroute_core::tlv::Name;
use ndn_traceroute_core::{StatusCode, DEFAULT_FACE_URI};
use ndn_traceroute_face::FaceUri;
use ndn_traceroute_responder::Responder;
use std::process::ExitCode;
use std::time::Duration;

/// NDN traceroute responder.
#[derive(Parser, Debug)]
#[command(name = "traceroute-responder")]
#[command(version)]
#[command(about = "Answers NDN traceroute probes under a prefix")]
struct Args {
    /// Name this node reports in its replies.
    responder_name: String,

    /// Prefix to register and answer under.
    prefix: String,

    /// Status code placed in replies (1, 2 and 3 mark the destination).
    #[arg(long = "status-code", default_value_t = StatusCode::NO_ERROR.0)]
    status_code: u64,

    /// FreshnessPeriod of replies in milliseconds.
    #[arg(long, default_value_t = 1000)]
    freshness: u64,

    /// Forwarder face URI.
    #[arg(long, env = "NDN_CLIENT_TRANSPORT", default_value = DEFAULT_FACE_URI)]
    face: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

fn parse_name(label: &str, value: &str) -> Result<Name, String> {
    let name: Name = value
        .parse()
        .map_err(|e| format!("Invalid {} {}: {}", label, value, e))?;
    if name.is_empty() {
        return Err(format!("{} must have at least one component", label));
    }
    Ok(name)
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
    let filter = match args.log_level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let (name, prefix) = match (
        parse_name("responder name", &args.responder_name),
        parse_name("prefix", &args.prefix),
    ) {
        (Ok(name), Ok(prefix)) => (name, prefix),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let uri: FaceUri = match args.face.parse() {
        Ok(uri) => uri,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let responder = Responder::new(name, prefix)
        .with_status(StatusCode(args.status_code))
        .with_freshness(Duration::from_millis(args.freshness));

    let mut face = match uri.connect().await {
        Ok(face) => face,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to forwarder");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(face = %uri, "Connected to forwarder");

    tokio::select! {
        result = responder.serve(&mut face) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Responder stopped");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
            ExitCode::SUCCESS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["traceroute-responder", "/router", "/router"]).unwrap();
        assert_eq!(args.status_code, 4);
        assert_eq!(args.freshness, 1000);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_missing_prefix_is_usage_error() {
        let err = Args::try_parse_from(["traceroute-responder", "/router"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_bad_status_code_is_usage_error() {
        let err = Args::try_parse_from([
            "traceroute-responder",
            "/router",
            "/router",
            "--status-code",
            "abc",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(parse_name("prefix", "/").is_err());
        assert!(parse_name("prefix", "/a/b").is_ok());
    }
}
