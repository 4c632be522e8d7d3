//! Traceroute runner: connects the face, drives the session, prints hops.

use ndn_traceroute_core::{
    run_traceroute as run_session_over, HopStatus, SessionEvent, Termination, TracerouteConfig,
    TracerouteError, TracerouteReport,
};
use ndn_traceroute_face::FaceUri;
use tracing::info;

/// Where a progress line is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Stdout(String),
    Stderr(String),
}

impl Line {
    fn print(&self) {
        match self {
            Line::Stdout(text) => println!("{}", text),
            Line::Stderr(text) => eprintln!("{}", text),
        }
    }
}

/// Formats a session event as a progress line.
pub fn format_event(event: &SessionEvent) -> Line {
    match event {
        SessionEvent::ProbeSent { hop_limit, .. } => {
            Line::Stdout(format!("Sent Interest with HopLimit: {}", hop_limit))
        }
        SessionEvent::HopCompleted(hop) => match &hop.status {
            HopStatus::Reply {
                responder,
                status,
                rtt,
                ..
            } => Line::Stdout(format!(
                "Hop {}, RTT: {:.3} ms, Forwarder: {}, Reply Code: {}",
                hop.hop_limit,
                rtt.as_secs_f64() * 1000.0,
                responder,
                status
            )),
            HopStatus::Timeout => Line::Stdout(format!(
                "Timeout for Interest with HopLimit: {}",
                hop.hop_limit
            )),
            HopStatus::Nack { reason } => Line::Stderr(format!(
                "Received Nack for Interest {} with reason {}",
                hop.probe_name, reason
            )),
            HopStatus::Malformed { reason } => Line::Stderr(format!(
                "Malformed reply for HopLimit {}: {}",
                hop.hop_limit, reason
            )),
        },
    }
}

/// The closing line for a finished session.
pub fn format_termination(termination: &Termination) -> Line {
    match termination {
        Termination::DestinationReached { .. } => {
            Line::Stdout("Destination reached. Traceroute completed.".to_string())
        }
        Termination::MaxHopLimitReached => {
            Line::Stdout("Reached maximum HopLimit. Traceroute completed.".to_string())
        }
    }
}

/// Runs a traceroute through the forwarder named in `config`.
///
/// Progress lines are printed as the session advances unless `quiet` is set.
pub async fn run_traceroute(
    config: &TracerouteConfig,
    quiet: bool,
) -> Result<TracerouteReport, TracerouteError> {
    let uri: FaceUri = config.face_uri.parse()?;
    let mut face = uri.connect().await?;
    info!(face = %uri, target = %config.target, "Connected to forwarder");

    let report = run_session_over(&mut face, config, |event| {
        if !quiet {
            format_event(event).print();
        }
    })
    .await?;

    if !quiet {
        format_termination(&report.termination).print();
    }
    Ok(report)
}
