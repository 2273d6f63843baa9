//! Integration tests over real UDP sockets on the loopback interface
//!
//! These drive the full path: datagram in, parse, dispatch, reply datagram
//! back to the sender.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use retrocmd_shared::{BindId, SendSpec};

use crate::command::{
    CommandInterface, CommandState, NetworkListener, send_command, send_command_with_reply,
};
use crate::config::Config;
use crate::event::{Dispatcher, EventCommand};
use crate::runloop::Runloop;
use crate::services::Services;
use crate::test_utils::{RecordingHandler, fake_services, world};

const TIMEOUT: Duration = Duration::from_secs(2);

fn loopback_listener() -> NetworkListener {
    NetworkListener::bind("127.0.0.1", 0).unwrap()
}

fn client() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_read_timeout(Some(TIMEOUT)).unwrap();
    socket
}

/// Drain until at least one datagram was processed or the timeout passes.
fn drain_some(listener: &mut NetworkListener, state: &mut CommandState, handler: &mut RecordingHandler) {
    let deadline = std::time::Instant::now() + TIMEOUT;
    while listener.drain(state, handler) == 0 {
        assert!(std::time::Instant::now() < deadline, "no datagram arrived");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn poll_until(dispatcher: &mut Dispatcher, id: BindId) -> CommandState {
    let deadline = std::time::Instant::now() + TIMEOUT;
    loop {
        let state = dispatcher.poll_commands();
        if state.get(id) {
            return state;
        }
        assert!(std::time::Instant::now() < deadline, "{id} never arrived");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn recv_line(socket: &UdpSocket) -> (String, SocketAddr) {
    let mut buf = [0u8; 4096];
    let (len, from) = socket.recv_from(&mut buf).unwrap();
    (String::from_utf8_lossy(&buf[..len]).into_owned(), from)
}

#[test]
fn bound_port_is_reported() {
    let listener = loopback_listener();
    let addr = listener.local_addr();
    assert!(addr.ip().is_loopback());
    assert_ne!(addr.port(), 0);
}

#[test]
fn bad_address_is_an_error() {
    assert!(NetworkListener::bind("not an address", 55355).is_err());
}

#[test]
fn binds_arrive_over_udp() {
    let mut listener = loopback_listener();
    let client = client();
    client
        .send_to(b"PAUSE_TOGGLE\nSCREENSHOT\nBOGUS\n", listener.local_addr())
        .unwrap();

    let mut state = CommandState::default();
    let mut handler = RecordingHandler::default();
    drain_some(&mut listener, &mut state, &mut handler);

    assert!(state.get(BindId::PauseToggle));
    assert!(state.get(BindId::Screenshot));
    assert_eq!(state.pressed().count(), 2);
}

#[test]
fn each_datagram_is_a_batch() {
    let mut listener = loopback_listener();
    let client = client();
    client.send_to(b"QUIT", listener.local_addr()).unwrap();
    client.send_to(b"RESET\n", listener.local_addr()).unwrap();

    let mut state = CommandState::default();
    let mut handler = RecordingHandler::default();
    let deadline = std::time::Instant::now() + TIMEOUT;
    while !(state.get(BindId::Quit) && state.get(BindId::Reset)) {
        assert!(std::time::Instant::now() < deadline);
        listener.drain(&mut state, &mut handler);
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn version_reply_goes_back_to_sender() {
    let listener = loopback_listener();
    let addr = listener.local_addr();
    let world = world();
    let mut dispatcher =
        Dispatcher::new(Config::default(), fake_services(&world)).with_version("4.5.6");
    dispatcher.install_command_interface(CommandInterface::with_transports(Some(listener), None));

    let client = client();
    client.send_to(b"VERSION\nFAST_FORWARD\n", addr).unwrap();
    poll_until(&mut dispatcher, BindId::FastForward);

    let (reply, from) = recv_line(&client);
    assert_eq!(reply, "4.5.6\n");
    assert_eq!(from, addr);
}

#[test]
fn memory_round_trip_over_udp() {
    let listener = loopback_listener();
    let addr = listener.local_addr();
    let dir = tempfile::tempdir().unwrap();
    let content = dir.path().join("game.bin");
    std::fs::write(&content, b"rom").unwrap();

    let mut dispatcher = Dispatcher::new(Config::default(), Services::headless());
    assert!(dispatcher.execute(EventCommand::LoadCore(dir.path().join("core.so"))));
    assert!(dispatcher.execute(EventCommand::LoadContent(content)));
    dispatcher.install_command_interface(CommandInterface::with_transports(Some(listener), None));

    let client = client();
    client
        .send_to(b"WRITE_CORE_RAM 100 12 34\nREAD_CORE_RAM 100 2\nMUTE\n", addr)
        .unwrap();
    poll_until(&mut dispatcher, BindId::Mute);

    let (reply, _) = recv_line(&client);
    assert_eq!(reply, "READ_CORE_RAM 100 12 34\n");
}

#[test]
fn runloop_quits_on_remote_command() {
    let listener = loopback_listener();
    let addr = listener.local_addr();
    let world = world();
    let mut dispatcher = Dispatcher::new(Config::default(), fake_services(&world));
    dispatcher.install_command_interface(CommandInterface::with_transports(Some(listener), None));
    let mut runloop = Runloop::new(dispatcher);

    client().send_to(b"QUIT\n", addr).unwrap();
    let deadline = std::time::Instant::now() + TIMEOUT;
    while runloop.run_frame() {
        assert!(std::time::Instant::now() < deadline, "quit never arrived");
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(runloop.dispatcher().state().quit_requested);
}

#[test]
fn send_command_reaches_listener() {
    let mut listener = loopback_listener();
    let port = listener.local_addr().port();
    let spec = SendSpec::parse(&format!("FRAMEADVANCE;127.0.0.1;{port}")).unwrap();
    let target = send_command(&spec).unwrap();
    assert_eq!(target.port(), port);

    let mut state = CommandState::default();
    let mut handler = RecordingHandler::default();
    drain_some(&mut listener, &mut state, &mut handler);
    assert!(state.get(BindId::FrameAdvance));
}

#[test]
fn send_with_reply_waits_for_answer() {
    let listener = loopback_listener();
    let port = listener.local_addr().port();
    let spec = SendSpec::parse(&format!("VERSION;127.0.0.1;{port}")).unwrap();

    // The listener has to answer while the client blocks, so it runs on its
    // own thread with its own dispatcher.
    let server = std::thread::spawn(move || {
        let mut listener = listener;
        let mut state = CommandState::default();
        let mut handler = RecordingHandler::default();
        drain_some(&mut listener, &mut state, &mut handler);
        handler.actions.len()
    });

    let reply = send_command_with_reply(&spec, TIMEOUT).unwrap();
    assert_eq!(reply.as_deref(), Some("test-version\n"));
    assert_eq!(server.join().unwrap(), 1);
}
