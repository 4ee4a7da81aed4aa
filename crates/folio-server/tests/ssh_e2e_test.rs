//! End-to-end tests over a real SSH connection.
//!
//! A russh client logs in to a server bound on an ephemeral port, asks for a
//! pseudo-terminal and a shell, and drives the portfolio with keystrokes.

use std::{sync::Arc, time::Duration};

use folio_server::{AppEnv, Server, ServerConfig, ServerHandle};
use rand::rngs::OsRng;
use russh::{
    Channel, ChannelMsg,
    client::{self, KeyboardInteractiveAuthResponse},
    keys::{
        PrivateKeyWithHashAlg,
        ssh_key::{Algorithm, PrivateKey, PublicKey},
    },
};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(10);
const ENTER_ALT_SCREEN: &str = "\x1b[?1049h";
const LEAVE_ALT_SCREEN: &str = "\x1b[?1049l";

/// Client that trusts any host key.
struct Visitor;

impl client::Handler for Visitor {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _key: &PublicKey) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Everything the server sent on one channel.
#[derive(Debug, Default)]
struct Transcript {
    output: Vec<u8>,
    exit_status: Option<u32>,
    closed: bool,
}

impl Transcript {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

/// Read channel messages into `transcript` until `done` holds or the
/// channel closes.
async fn pump_until(
    channel: &mut Channel<client::Msg>,
    transcript: &mut Transcript,
    done: impl Fn(&Transcript) -> bool,
) {
    tokio::time::timeout(TIMEOUT, async {
        while !done(transcript) {
            match channel.wait().await {
                Some(ChannelMsg::Data { data }) => transcript.output.extend_from_slice(&data),
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    transcript.exit_status = Some(exit_status);
                },
                Some(ChannelMsg::Close) | None => {
                    transcript.closed = true;
                    break;
                },
                Some(_) => {},
            }
        }
    })
    .await
    .unwrap();
}

async fn start_server() -> (TempDir, std::net::SocketAddr, ServerHandle) {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        app_env: AppEnv::Unset,
        host_key_path: dir.path().join("id_ed25519"),
        idle_timeout: Duration::from_secs(30),
    };

    let server = Server::bind(&config).await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = server.handle();
    tokio::spawn(server.listen_and_serve());

    (dir, addr, handle)
}

async fn connect(addr: std::net::SocketAddr) -> client::Handle<Visitor> {
    let config = Arc::new(client::Config::default());
    tokio::time::timeout(TIMEOUT, client::connect(config, addr, Visitor)).await.unwrap().unwrap()
}

async fn login(addr: std::net::SocketAddr) -> client::Handle<Visitor> {
    let mut session = connect(addr).await;
    let key = PrivateKey::random(&mut OsRng, Algorithm::Ed25519).unwrap();
    let auth = session
        .authenticate_publickey("visitor", PrivateKeyWithHashAlg::new(Arc::new(key), None))
        .await
        .unwrap();
    assert!(auth.success());
    session
}

/// Open a session channel with a 120x40 pty and a shell, and wait for the
/// first frame.
async fn open_shell(
    session: &client::Handle<Visitor>,
    transcript: &mut Transcript,
) -> Channel<client::Msg> {
    let mut channel = session.channel_open_session().await.unwrap();
    channel.request_pty(true, "xterm-256color", 120, 40, 0, 0, &[]).await.unwrap();
    channel.request_shell(true).await.unwrap();

    pump_until(&mut channel, transcript, |t| t.text().contains("About")).await;
    channel
}

#[tokio::test]
async fn visitor_browses_and_quits() {
    let (_dir, addr, handle) = start_server().await;
    let session = login(addr).await;
    let mut transcript = Transcript::default();
    let mut channel = open_shell(&session, &mut transcript).await;

    assert!(transcript.text().starts_with(ENTER_ALT_SCREEN));
    assert!(!transcript.text().contains("LinkedIn:"));

    channel.data(&b"c"[..]).await.unwrap();
    pump_until(&mut channel, &mut transcript, |t| t.text().contains("LinkedIn:")).await;

    channel.data(&b"q"[..]).await.unwrap();
    pump_until(&mut channel, &mut transcript, |t| t.closed).await;

    assert_eq!(transcript.exit_status, Some(0));
    assert!(transcript.text().ends_with(LEAVE_ALT_SCREEN));

    handle.shutdown(TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn every_auth_method_is_accepted() {
    let (_dir, addr, handle) = start_server().await;

    let mut session = connect(addr).await;
    assert!(session.authenticate_none("visitor").await.unwrap().success());

    let mut session = connect(addr).await;
    assert!(session.authenticate_password("visitor", "anything").await.unwrap().success());

    let mut session = connect(addr).await;
    let response =
        session.authenticate_keyboard_interactive_start("visitor", None::<String>).await.unwrap();
    assert!(matches!(response, KeyboardInteractiveAuthResponse::Success));

    let _session = login(addr).await;

    handle.shutdown(TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn second_session_channel_is_refused() {
    let (_dir, addr, handle) = start_server().await;
    let session = login(addr).await;
    let mut transcript = Transcript::default();
    let mut channel = open_shell(&session, &mut transcript).await;

    assert!(session.channel_open_session().await.is_err());

    // The first session is unaffected.
    channel.data(&b"q"[..]).await.unwrap();
    pump_until(&mut channel, &mut transcript, |t| t.closed).await;
    assert_eq!(transcript.exit_status, Some(0));

    handle.shutdown(TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn exec_request_is_served_as_shell() {
    let (_dir, addr, handle) = start_server().await;
    let session = login(addr).await;

    let mut channel = session.channel_open_session().await.unwrap();
    channel.request_pty(true, "xterm", 80, 24, 0, 0, &[]).await.unwrap();
    channel.exec(true, "uptime").await.unwrap();

    let mut transcript = Transcript::default();
    pump_until(&mut channel, &mut transcript, |t| t.text().contains("About")).await;

    channel.data(&[0x03][..]).await.unwrap();
    pump_until(&mut channel, &mut transcript, |t| t.closed).await;
    assert_eq!(transcript.exit_status, Some(0));

    handle.shutdown(TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn session_without_pty_is_rejected() {
    let (_dir, addr, handle) = start_server().await;
    let session = login(addr).await;

    let mut channel = session.channel_open_session().await.unwrap();
    channel.request_shell(true).await.unwrap();

    let mut transcript = Transcript::default();
    pump_until(&mut channel, &mut transcript, |t| t.closed).await;

    assert_eq!(transcript.text(), "Requires an active PTY\r\n");
    assert_eq!(transcript.exit_status, Some(1));

    handle.shutdown(TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn oversized_window_does_not_take_the_server_down() {
    let (_dir, addr, handle) = start_server().await;
    let session = login(addr).await;

    let mut channel = session.channel_open_session().await.unwrap();
    channel.request_pty(true, "xterm", 100_000, 100_000, 0, 0, &[]).await.unwrap();
    channel.request_shell(true).await.unwrap();

    let mut transcript = Transcript::default();
    pump_until(&mut channel, &mut transcript, |t| t.text().contains("About")).await;
    channel.window_change(u32::MAX, u32::MAX, 0, 0).await.unwrap();
    channel.data(&b"q"[..]).await.unwrap();
    pump_until(&mut channel, &mut transcript, |t| t.closed).await;
    assert_eq!(transcript.exit_status, Some(0));

    // Other visitors are still served.
    let other = login(addr).await;
    let mut transcript = Transcript::default();
    let _channel = open_shell(&other, &mut transcript).await;

    handle.shutdown(TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn shutdown_restores_visitor_terminal() {
    let (_dir, addr, handle) = start_server().await;
    let session = login(addr).await;
    let mut transcript = Transcript::default();
    let mut channel = open_shell(&session, &mut transcript).await;

    let shutdown = tokio::spawn(async move { handle.shutdown(TIMEOUT).await });
    pump_until(&mut channel, &mut transcript, |t| t.closed).await;

    assert_eq!(transcript.exit_status, Some(0));
    assert!(transcript.text().ends_with(LEAVE_ALT_SCREEN));
    shutdown.await.unwrap().unwrap();
}

/// The binary, detached from any controlling terminal, serves a full
/// session.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn binary_serves_without_controlling_terminal() {
    use std::process::Stdio;

    let dir = tempfile::tempdir().unwrap();
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();

    let _server = tokio::process::Command::new("setsid")
        .arg(env!("CARGO_BIN_EXE_folio-server"))
        .env("PORT", port.to_string())
        .env("HOST", "127.0.0.1")
        .env("APP_ENV", "test")
        .env("HOST_KEY_PATH", dir.path().join("id_ed25519"))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .unwrap();

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    let started = tokio::time::Instant::now();
    while tokio::net::TcpStream::connect(addr).await.is_err() {
        assert!(started.elapsed() < TIMEOUT, "server did not start listening");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let session = login(addr).await;
    let mut transcript = Transcript::default();
    let mut channel = open_shell(&session, &mut transcript).await;

    channel.data(&b"cq"[..]).await.unwrap();
    pump_until(&mut channel, &mut transcript, |t| t.closed).await;

    assert!(transcript.text().contains("LinkedIn:"));
    assert_eq!(transcript.exit_status, Some(0));
}
