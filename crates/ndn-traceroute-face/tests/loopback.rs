//! Face tests against an in-process fake forwarder.

use ndn_traceroute_core::{
    run_traceroute, ProbeKey, ProbeRequest, ProbeTransport, ReplyPayload, StatusCode,
    Termination, TracerouteConfig, TracerouteError, TransportOutcome,
};
use ndn_traceroute_face::control::{command_parameters, RIB_REGISTER_PREFIX};
use ndn_traceroute_face::{ControlResponse, Face, FaceUri, FrameSink, FrameSource};
use ndn_traceroute_tlv::{Data, Interest, NackReason, Name, NetPacket};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::time::Instant;

/// The forwarder end of a face: raw packets in and out.
struct Forwarder {
    source: FrameSource,
    sink: FrameSink,
}

impl Forwarder {
    fn new<S: AsyncRead + AsyncWrite + Send + 'static>(stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            source: FrameSource::new(Box::new(reader)),
            sink: FrameSink::new(Box::new(writer)),
        }
    }

    async fn recv(&mut self) -> NetPacket {
        let frame = self.source.read_frame().await.unwrap();
        NetPacket::from_frame(&frame).unwrap().unwrap()
    }

    async fn recv_interest(&mut self) -> Interest {
        match self.recv().await {
            NetPacket::Interest(interest) => interest,
            other => panic!("expected an Interest, got {:?}", other),
        }
    }

    async fn send(&mut self, packet: NetPacket) {
        self.sink.write_block(&packet.to_block()).await.unwrap();
    }

    async fn reply(&mut self, interest: &Interest, content: Vec<u8>) {
        let mut data = Data::new(interest.name.clone(), content);
        data.sign_digest_sha256();
        self.send(NetPacket::Data(data)).await;
    }
}

fn connected() -> (Face, Forwarder) {
    let (client, server) = tokio::io::duplex(64 * 1024);
    (Face::from_stream(client, "duplex"), Forwarder::new(server))
}

fn probe(key: u64, hop_limit: u8) -> ProbeRequest {
    let nonce = 1000 + key;
    ProbeRequest {
        key: ProbeKey::new(key),
        target: "/example/test".parse().unwrap(),
        name: "/example/test/traceroute"
            .parse::<Name>()
            .unwrap()
            .append(ndn_traceroute_tlv::Component::number(nonce)),
        hop_limit,
        nonce,
        must_be_fresh: true,
        sent_at: Instant::now(),
    }
}

#[tokio::test]
async fn test_data_answers_probe() {
    let (mut face, mut forwarder) = connected();
    let probe = probe(1, 2);
    face.express(&probe, Duration::from_secs(4)).await.unwrap();

    let interest = forwarder.recv_interest().await;
    assert_eq!(interest.name, probe.name);
    assert_eq!(interest.hop_limit, Some(2));
    assert_eq!(interest.nonce, Some(probe.wire_nonce()));
    assert!(interest.must_be_fresh);
    assert_eq!(interest.lifetime, Some(Duration::from_secs(4)));

    forwarder.reply(&interest, vec![1, 2, 3]).await;
    let event = face.next_event().await.unwrap();
    assert_eq!(event.key, probe.key);
    match event.outcome {
        TransportOutcome::Data(data) => assert_eq!(data.content, vec![1, 2, 3]),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(face.pending_count(), 0);
}

#[tokio::test]
async fn test_lifetime_expiry_reports_timeout() {
    let (mut face, mut forwarder) = connected();
    let probe = probe(2, 1);
    let started = Instant::now();
    face.express(&probe, Duration::from_millis(50)).await.unwrap();
    forwarder.recv_interest().await;

    let event = face.next_event().await.unwrap();
    assert_eq!(event.key, probe.key);
    assert_eq!(event.outcome, TransportOutcome::Timeout);
    assert!(started.elapsed() >= Duration::from_millis(50));

    // Nothing is pending any more.
    assert!(face.next_event().await.is_err());
}

#[tokio::test]
async fn test_nack_is_matched_by_name_and_nonce() {
    let (mut face, mut forwarder) = connected();
    let probe = probe(3, 4);
    face.express(&probe, Duration::from_secs(4)).await.unwrap();
    let interest = forwarder.recv_interest().await;

    let mut other_nonce = interest.clone();
    other_nonce.nonce = Some(interest.nonce.unwrap().wrapping_add(1));
    forwarder
        .send(NetPacket::Nack {
            interest: other_nonce,
            reason: NackReason::Duplicate,
        })
        .await;
    forwarder
        .send(NetPacket::Nack {
            interest,
            reason: NackReason::NoRoute,
        })
        .await;

    let event = face.next_event().await.unwrap();
    assert_eq!(event.key, probe.key);
    assert_eq!(event.outcome, TransportOutcome::Nack(NackReason::NoRoute));
}

#[tokio::test]
async fn test_unsolicited_data_is_ignored() {
    let (mut face, mut forwarder) = connected();
    let probe = probe(4, 1);
    face.express(&probe, Duration::from_secs(4)).await.unwrap();
    let interest = forwarder.recv_interest().await;

    forwarder
        .reply(&Interest::new("/somewhere/else".parse().unwrap()), vec![9])
        .await;
    forwarder.reply(&interest, vec![4]).await;

    let event = face.next_event().await.unwrap();
    match event.outcome {
        TransportOutcome::Data(data) => assert_eq!(data.name, probe.name),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_forwarder_disconnect_is_fatal() {
    let (mut face, forwarder) = connected();
    face.express(&probe(5, 1), Duration::from_secs(4))
        .await
        .unwrap();
    drop(forwarder);

    assert!(matches!(
        face.next_event().await,
        Err(TracerouteError::FaceClosed)
    ));
}

#[tokio::test]
async fn test_register_prefix_and_serve() {
    let (mut face, mut forwarder) = connected();
    let prefix: Name = "/router/a".parse().unwrap();

    let nfd = tokio::spawn(async move {
        let command = forwarder.recv_interest().await;
        let register: Name = RIB_REGISTER_PREFIX.parse().unwrap();
        assert!(register.is_prefix_of(&command.name));
        assert!(command.verify_digest_sha256());
        let params = command_parameters(&command).unwrap();
        assert_eq!(params.name, Some("/router/a".parse().unwrap()));

        let mut response = ControlResponse::new(200, "OK");
        response.body = Some(params);
        forwarder
            .reply(&command, response.to_block().to_wire())
            .await;

        let mut incoming = Interest::new("/router/a/traceroute/%07".parse().unwrap());
        incoming.nonce = Some(7);
        forwarder.send(NetPacket::Interest(incoming)).await;

        match forwarder.recv().await {
            NetPacket::Data(data) => data,
            other => panic!("expected Data, got {:?}", other),
        }
    });

    face.register_prefix(&prefix).await.unwrap();
    let interest = face.next_interest().await.unwrap();
    assert_eq!(interest.name.to_string(), "/router/a/traceroute/%07");

    let reply = Data::new(interest.name.clone(), vec![5]);
    face.put_data(&reply).await.unwrap();

    let received = nfd.await.unwrap();
    assert_eq!(received.name, interest.name);
    assert_eq!(received.content, vec![5]);
}

#[tokio::test]
async fn test_register_prefix_rejected() {
    let (mut face, mut forwarder) = connected();

    let nfd = tokio::spawn(async move {
        let command = forwarder.recv_interest().await;
        let response = ControlResponse::new(403, "authorization rejected");
        forwarder
            .reply(&command, response.to_block().to_wire())
            .await;
        forwarder
    });

    let err = face
        .register_prefix(&"/router/a".parse().unwrap())
        .await
        .unwrap_err();
    match err {
        TracerouteError::RegistrationFailed { code, text, .. } => {
            assert_eq!(code, 403);
            assert_eq!(text, "authorization rejected");
        }
        other => panic!("unexpected error {:?}", other),
    }
    drop(nfd.await.unwrap());
}

/// Answers probes the way a two-hop path would: a router, then the producer.
async fn two_hop_forwarder(listener: TcpListener) {
    let (stream, _) = listener.accept().await.unwrap();
    let mut forwarder = Forwarder::new(stream);
    loop {
        let interest = match forwarder.source.read_frame().await {
            Ok(frame) => match NetPacket::from_frame(&frame).unwrap() {
                Some(NetPacket::Interest(interest)) => interest,
                _ => continue,
            },
            Err(_) => return,
        };
        let (responder, code) = match interest.hop_limit {
            Some(1) => ("/router/a", 4),
            _ => ("/example/test", 1),
        };
        let payload = ReplyPayload::new(responder.parse().unwrap(), StatusCode(code));
        forwarder.reply(&interest, payload.encode()).await;
    }
}

#[tokio::test]
async fn test_traceroute_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(two_hop_forwarder(listener));

    let uri: FaceUri = format!("tcp4://127.0.0.1:{}", port).parse().unwrap();
    let mut face = uri.connect().await.unwrap();
    let config = TracerouteConfig::new("/example/test".parse().unwrap());

    let report = run_traceroute(&mut face, &config, |_| {}).await.unwrap();
    assert_eq!(
        report.termination,
        Termination::DestinationReached { hop_limit: 2 }
    );
    assert_eq!(report.hops[0].responder.as_deref(), Some("/router/a"));
    assert_eq!(report.hops[1].responder.as_deref(), Some("/example/test"));

    // The session closed the face, so the forwarder sees end of stream.
    server.await.unwrap();
}
