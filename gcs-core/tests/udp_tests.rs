use std::{net::UdpSocket, thread, time::Duration};

use gcs_core::utils::{
    config::DisplayMode,
    connection::{ingest::Ingest, udp},
    controllers::{EdgeTracker, Key, KeyEvent, Teleop},
    protocol::Command,
    TelemetryIngestor,
};

/// Stand-in robot bound on loopback.
fn robot() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    socket
}

#[test]
fn commands_arrive_as_bare_datagrams() {
    let robot = robot();
    let port = robot.local_addr().unwrap().port();
    let (tx, _rx) = udp::open("127.0.0.1:0", "127.0.0.1", port).unwrap();
    assert_eq!(tx.peer(), robot.local_addr().unwrap());

    let mut teleop = Teleop::new(EdgeTracker::default(), tx);
    teleop.handle(KeyEvent::Press(Key::W));
    teleop.handle(KeyEvent::Release(Key::W));

    let mut buf = [0u8; 64];
    let (len, _) = robot.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..len], b"FORWARD");
    let (len, _) = robot.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..len], b"STOP");
    assert_eq!(teleop.dispatcher().stats().sent, 2);
}

#[test]
fn telemetry_flows_back_on_the_same_socket() {
    let robot = robot();
    let port = robot.local_addr().unwrap().port();
    let (tx, rx) = udp::open("127.0.0.1:0", "127.0.0.1", port).unwrap();

    let ingest = thread::spawn(move || {
        let mut ingest = TelemetryIngestor::new(rx, Vec::new(), DisplayMode::Status);
        let outcome = ingest.poll_once();
        (outcome, ingest.into_output())
    });

    let mut teleop = Teleop::new(EdgeTracker::default(), tx);
    assert_eq!(teleop.handle(KeyEvent::Press(Key::E)), Some(Command::RotateE));

    let mut buf = [0u8; 64];
    let (len, client) = robot.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..len], b"ROTATE_E");
    robot
        .send_to(b"120,118,0.5,0.4,0,0,87.3", client)
        .unwrap();

    let (outcome, out) = ingest.join().unwrap();
    assert_eq!(outcome, Ingest::Displayed);
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("RPM: 120|118 | Load: 0.5|0.4 | Head: 87.3°"));
}

#[test]
fn unresolvable_peer_fails_at_startup() {
    let err = udp::open("127.0.0.1:0", "no-such-robot.invalid", 4210).unwrap_err();
    assert!(err.to_string().contains("no-such-robot.invalid"));
}
