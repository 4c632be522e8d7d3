//! Serial traceroute execution.
//!
//! Expresses one probe at a time and waits for its outcome before the
//! scheduler decides on the next one.

use crate::{
    HopResult, ProbeTransport, Scheduler, Step, Termination, TracerouteConfig, TracerouteError,
    TracerouteParams, TracerouteReport,
};
use ndn_traceroute_tlv::Name;
use tracing::{debug, warn};

/// Progress notifications emitted while a session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A probe was handed to the transport.
    ProbeSent { hop_limit: u8, name: Name },
    /// A probe reached its terminal outcome.
    HopCompleted(HopResult),
}

/// Everything a finished session produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub termination: Termination,
    pub hops: Vec<HopResult>,
    pub probes_sent: u32,
}

/// Drives `scheduler` to termination over `transport`.
///
/// The transport is closed exactly once, whether the session terminates
/// normally or fails. A close error is only reported if the session itself
/// succeeded.
pub async fn run_session<T, F>(
    transport: &mut T,
    scheduler: Scheduler,
    params: &TracerouteParams,
    mut on_event: F,
) -> Result<SessionSummary, TracerouteError>
where
    T: ProbeTransport + ?Sized,
    F: FnMut(&SessionEvent),
{
    params.validate()?;

    let result = drive(transport, scheduler, params, &mut on_event).await;
    let closed = transport.close().await;

    match (result, closed) {
        (Ok(summary), Ok(())) => Ok(summary),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                debug!(error = %close_err, "Error closing transport after failure");
            }
            Err(e)
        }
    }
}

async fn drive<T, F>(
    transport: &mut T,
    mut scheduler: Scheduler,
    params: &TracerouteParams,
    on_event: &mut F,
) -> Result<SessionSummary, TracerouteError>
where
    T: ProbeTransport + ?Sized,
    F: FnMut(&SessionEvent),
{
    let mut hops = Vec::new();
    let mut step = scheduler.start()?;

    loop {
        let probe = match step {
            Step::Probe(probe) => probe,
            Step::Finished(termination) => {
                debug!(
                    termination = %termination,
                    probes_sent = scheduler.probes_sent(),
                    "Traceroute finished"
                );
                return Ok(SessionSummary {
                    termination,
                    hops,
                    probes_sent: scheduler.probes_sent(),
                });
            }
        };

        debug!(hop_limit = probe.hop_limit, key = %probe.key, "Sending probe");
        transport.express(&probe, params.interest_lifetime).await?;
        on_event(&SessionEvent::ProbeSent {
            hop_limit: probe.hop_limit,
            name: probe.name.clone(),
        });

        let transition = loop {
            let event = transport.next_event().await?;
            match scheduler.on_event(event) {
                Ok(transition) => break transition,
                Err(e) if e.is_per_probe() => {
                    warn!(error = %e, "Dropping outcome, continuing");
                }
                Err(e) => return Err(e),
            }
        };

        on_event(&SessionEvent::HopCompleted(transition.hop.clone()));
        hops.push(transition.hop);
        step = transition.next;
    }
}

/// Runs a complete traceroute for `config` and builds the report.
pub async fn run_traceroute<T, F>(
    transport: &mut T,
    config: &TracerouteConfig,
    on_event: F,
) -> Result<TracerouteReport, TracerouteError>
where
    T: ProbeTransport + ?Sized,
    F: FnMut(&SessionEvent),
{
    config.validate()?;

    let scheduler = Scheduler::new(config.target.clone(), config.params.max_hop_limit)?;
    let summary = run_session(transport, scheduler, &config.params, on_event).await?;

    Ok(TracerouteReport::from_summary(
        &config.target,
        config.params.max_hop_limit,
        &summary,
    ))
}
