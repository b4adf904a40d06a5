//! Integration tests for the chat relay.
//!
//! Each test starts a live server on an ephemeral loopback port and talks
//! to it over real TCP connections. All reads go through a timeout so a
//! missed broadcast fails the test instead of hanging it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

use rax_chat_server::Server;
use rax_chat_server::server::ServerConfig;

fn test_config(max_clients: usize) -> ServerConfig {
    ServerConfig {
        port: 0,
        max_clients,
        ..ServerConfig::default()
    }
}

async fn start_test_server(max_clients: usize) -> (Arc<Server>, SocketAddr) {
    let server = Arc::new(Server::new(test_config(max_clients)).await.unwrap());
    let addr = server.local_addr().unwrap();

    let accept_server = Arc::clone(&server);
    tokio::spawn(async move { accept_server.start().await });

    (server, addr)
}

// Connects and completes the name handshake.
async fn connect_as(addr: SocketAddr, name: &str) -> BufReader<TcpStream> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(format!("{}\n", name).as_bytes())
        .await
        .unwrap();
    BufReader::new(stream)
}

async fn send(client: &mut BufReader<TcpStream>, message: &str) {
    client
        .get_mut()
        .write_all(format!("{}\n", message).as_bytes())
        .await
        .unwrap();
}

async fn recv_line(client: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    timeout(Duration::from_secs(2), client.read_line(&mut line))
        .await
        .expect("timed out waiting for a message")
        .unwrap();
    line
}

// Asserts that no data arrives on this connection for a short window.
async fn expect_silence(client: &mut BufReader<TcpStream>) {
    let mut buf = [0u8; 64];
    let result = timeout(Duration::from_millis(200), client.read(&mut buf)).await;
    assert!(result.is_err(), "expected no data, got some");
}

// Admission happens asynchronously after connect; poll until the registry
// reaches the expected occupancy.
async fn wait_for_clients(server: &Server, expected: usize) {
    for _ in 0..100 {
        if server.registry().len().await == expected {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("registry never reached {} clients", expected);
}

#[tokio::test]
async fn broadcast_reaches_everyone_except_the_sender() {
    let (server, addr) = start_test_server(3).await;

    let mut alice = connect_as(addr, "alice").await;
    let mut bob = connect_as(addr, "bob").await;
    let mut carol = connect_as(addr, "carol").await;
    wait_for_clients(&server, 3).await;

    send(&mut alice, "hi").await;

    assert_eq!(recv_line(&mut bob).await, "alice: hi\n");
    assert_eq!(recv_line(&mut carol).await, "alice: hi\n");
    expect_silence(&mut alice).await;
}

#[tokio::test]
async fn full_server_rejects_with_notice_and_close() {
    let (server, addr) = start_test_server(2).await;

    let _alice = connect_as(addr, "alice").await;
    let _bob = connect_as(addr, "bob").await;
    wait_for_clients(&server, 2).await;

    let mut carol = connect_as(addr, "carol").await;
    assert_eq!(recv_line(&mut carol).await, "server full. try again later.\n");

    // The connection is closed right after the notice.
    let mut line = String::new();
    let n = timeout(Duration::from_secs(2), carol.read_line(&mut line))
        .await
        .expect("timed out waiting for close")
        .unwrap();
    assert_eq!(n, 0);

    // Rejection left the admitted clients untouched.
    assert_eq!(server.registry().len().await, 2);
}

#[tokio::test]
async fn disconnect_frees_a_slot_for_the_next_client() {
    let (server, addr) = start_test_server(2).await;

    let mut alice = connect_as(addr, "alice").await;
    let mut bob = connect_as(addr, "bob").await;
    wait_for_clients(&server, 2).await;

    // carol bounces off the full server
    let mut carol = connect_as(addr, "carol").await;
    assert_eq!(recv_line(&mut carol).await, "server full. try again later.\n");

    send(&mut alice, "hi").await;
    assert_eq!(recv_line(&mut bob).await, "alice: hi\n");

    drop(bob);
    wait_for_clients(&server, 1).await;

    // carol reconnects into the freed slot
    let mut carol = connect_as(addr, "carol").await;
    wait_for_clients(&server, 2).await;

    send(&mut alice, "welcome back").await;
    assert_eq!(recv_line(&mut carol).await, "alice: welcome back\n");
}

#[tokio::test]
async fn display_name_is_used_verbatim() {
    let (server, addr) = start_test_server(2).await;

    let mut alice = connect_as(addr, "alice in wonderland").await;
    let mut bob = connect_as(addr, "bob").await;
    wait_for_clients(&server, 2).await;

    send(&mut alice, "tea?").await;
    assert_eq!(recv_line(&mut bob).await, "alice in wonderland: tea?\n");
}

#[tokio::test]
async fn oversized_display_name_is_truncated() {
    let (server, addr) = start_test_server(2).await;

    let long_name = "x".repeat(60);
    let mut noisy = connect_as(addr, &long_name).await;
    let mut bob = connect_as(addr, "bob").await;
    wait_for_clients(&server, 2).await;

    send(&mut noisy, "yo").await;
    assert_eq!(recv_line(&mut bob).await, format!("{}: yo\n", "x".repeat(49)));
}

#[tokio::test]
async fn messages_from_one_sender_arrive_in_order() {
    let (server, addr) = start_test_server(2).await;

    let mut alice = connect_as(addr, "alice").await;
    let mut bob = connect_as(addr, "bob").await;
    wait_for_clients(&server, 2).await;

    send(&mut alice, "one").await;
    send(&mut alice, "two").await;
    send(&mut alice, "three").await;

    assert_eq!(recv_line(&mut bob).await, "alice: one\n");
    assert_eq!(recv_line(&mut bob).await, "alice: two\n");
    assert_eq!(recv_line(&mut bob).await, "alice: three\n");
}

#[tokio::test]
async fn blank_lines_are_relayed() {
    let (server, addr) = start_test_server(2).await;

    let mut alice = connect_as(addr, "alice").await;
    let mut bob = connect_as(addr, "bob").await;
    wait_for_clients(&server, 2).await;

    send(&mut alice, "").await;
    assert_eq!(recv_line(&mut bob).await, "alice: \n");
}

#[tokio::test]
async fn abandoned_handshake_consumes_no_slot() {
    let (server, addr) = start_test_server(2).await;

    // Connect and vanish without ever sending a name.
    let ghost = TcpStream::connect(addr).await.unwrap();
    drop(ghost);
    sleep(Duration::from_millis(100)).await;
    assert_eq!(server.registry().len().await, 0);

    // The server is still serving.
    let mut alice = connect_as(addr, "alice").await;
    let mut bob = connect_as(addr, "bob").await;
    wait_for_clients(&server, 2).await;

    send(&mut alice, "still up?").await;
    assert_eq!(recv_line(&mut bob).await, "alice: still up?\n");
}

#[tokio::test]
async fn shutdown_disconnects_all_clients() {
    let (server, addr) = start_test_server(2).await;

    let mut alice = connect_as(addr, "alice").await;
    let _bob = connect_as(addr, "bob").await;
    wait_for_clients(&server, 2).await;

    server.shutdown();

    // Session tasks wind down, closing their connections.
    let mut line = String::new();
    let n = timeout(Duration::from_secs(2), alice.read_line(&mut line))
        .await
        .expect("timed out waiting for shutdown close")
        .unwrap();
    assert_eq!(n, 0);

    wait_for_clients(&server, 0).await;
}
