//! End-to-end tests over real TCP sockets

mod common;

use common::*;
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

#[tokio::test]
async fn test_socks5_ipv4_round_trip() {
    let echo = spawn_echo_server().await;
    let proxy = start_default_proxy().await;

    let mut client = socks5_negotiated(proxy.addr).await;
    client.write_all(&socks5_connect_ipv4(echo)).await.unwrap();

    let reply = read_socks5_reply(&mut client).await;
    assert_eq!(&reply[..4], &[0x05, 0x00, 0x00, 0x01]);
    assert_eq!(&reply[4..8], &echo.ip().octets());
    assert_eq!(&reply[8..], &echo.port().to_be_bytes());

    client.write_all(b"hello through the tunnel").await.unwrap();
    let mut echoed = [0u8; 24];
    client.read_exact(&mut echoed).await.unwrap();
    assert_eq!(&echoed, b"hello through the tunnel");

    drop(client);
    proxy.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_socks5_domain_round_trip() {
    let echo = spawn_echo_server().await;
    let proxy = start_default_proxy().await;

    let mut client = socks5_negotiated(proxy.addr).await;
    client
        .write_all(&socks5_connect_domain("localhost", echo.port()))
        .await
        .unwrap();

    let reply = read_socks5_reply(&mut client).await;
    assert_eq!(&reply[..4], &[0x05, 0x00, 0x00, 0x01]);
    assert_eq!(&reply[4..8], &Ipv4Addr::LOCALHOST.octets());

    client.write_all(b"ping").await.unwrap();
    let mut echoed = [0u8; 4];
    client.read_exact(&mut echoed).await.unwrap();
    assert_eq!(&echoed, b"ping");
}

#[tokio::test]
async fn test_socks5_no_acceptable_method() {
    let proxy = start_default_proxy().await;

    let mut client = TcpStream::connect(proxy.addr).await.unwrap();
    // Username/password only
    client.write_all(&[0x05, 0x01, 0x02]).await.unwrap();

    let mut selection = [0u8; 2];
    client.read_exact(&mut selection).await.unwrap();
    assert_eq!(selection, [0x05, 0xFF]);
    assert!(read_to_eof(&mut client).await.is_empty());
}

#[tokio::test]
async fn test_socks5_unresolvable_domain() {
    let proxy = start_default_proxy().await;

    let mut client = socks5_negotiated(proxy.addr).await;
    client
        .write_all(&socks5_connect_domain("no-such-host.invalid", 80))
        .await
        .unwrap();

    let reply = read_socks5_reply(&mut client).await;
    assert_eq!(reply, [0x05, 0x04, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
    assert!(read_to_eof(&mut client).await.is_empty());
}

#[tokio::test]
async fn test_socks5_unreachable_destination() {
    let dest = closed_port().await;
    let proxy = start_default_proxy().await;

    let mut client = socks5_negotiated(proxy.addr).await;
    client.write_all(&socks5_connect_ipv4(dest)).await.unwrap();

    let reply = read_socks5_reply(&mut client).await;
    assert_eq!(reply, [0x05, 0x04, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn test_socks5_bind_not_supported() {
    let proxy = start_default_proxy().await;

    let mut client = socks5_negotiated(proxy.addr).await;
    let mut request = socks5_connect_ipv4("127.0.0.1:80".parse().unwrap());
    request[1] = 0x02;
    client.write_all(&request).await.unwrap();

    let reply = read_socks5_reply(&mut client).await;
    assert_eq!(reply, [0x05, 0x07, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn test_socks5_short_request_general_failure() {
    let proxy = start_default_proxy().await;

    let mut client = socks5_negotiated(proxy.addr).await;
    client
        .write_all(&[0x05, 0x01, 0x00, 0x01, 127, 0, 0, 1])
        .await
        .unwrap();

    let reply = read_socks5_reply(&mut client).await;
    assert_eq!(reply, [0x05, 0x01, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn test_unknown_version_closed_without_reply() {
    let proxy = start_default_proxy().await;

    let mut client = TcpStream::connect(proxy.addr).await.unwrap();
    client.write_all(&[0x07, 0x01, 0x00]).await.unwrap();

    assert!(read_to_eof(&mut client).await.is_empty());
}

#[tokio::test]
async fn test_socks4_round_trip() {
    let echo = spawn_echo_server().await;
    let proxy = start_default_proxy().await;

    let mut client = TcpStream::connect(proxy.addr).await.unwrap();
    client.write_all(&socks4_connect(echo, b"alice")).await.unwrap();

    let mut reply = [0u8; 8];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0x00, 0x5A, 0, 0, 0, 0, 0, 0]);

    client.write_all(b"legacy").await.unwrap();
    let mut echoed = [0u8; 6];
    client.read_exact(&mut echoed).await.unwrap();
    assert_eq!(&echoed, b"legacy");
}

#[tokio::test]
async fn test_socks4_unreachable_destination() {
    let dest = closed_port().await;
    let proxy = start_default_proxy().await;

    let mut client = TcpStream::connect(proxy.addr).await.unwrap();
    client.write_all(&socks4_connect(dest, b"")).await.unwrap();

    let mut reply = [0u8; 8];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0x00, 0x5B, 0, 0, 0, 0, 0, 0]);
    assert!(read_to_eof(&mut client).await.is_empty());
}

#[tokio::test]
async fn test_socks4_disabled() {
    let echo = spawn_echo_server().await;
    let proxy = start_proxy(TestConfigBuilder::new().enable_socks4(false).build()).await;

    let mut client = TcpStream::connect(proxy.addr).await.unwrap();
    client.write_all(&socks4_connect(echo, b"")).await.unwrap();

    assert!(read_to_eof(&mut client).await.is_empty());
}

#[tokio::test]
async fn test_half_close_delivers_response() {
    let (listener, upstream_addr) = create_test_listener().await;

    // Upstream answers only once the client has finished sending
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        stream.read_to_end(&mut request).await.unwrap();
        let response = format!("got {} bytes", request.len());
        stream.write_all(response.as_bytes()).await.unwrap();
    });

    let proxy = start_default_proxy().await;
    let mut client = socks5_negotiated(proxy.addr).await;
    client
        .write_all(&socks5_connect_ipv4(upstream_addr))
        .await
        .unwrap();
    let reply = read_socks5_reply(&mut client).await;
    assert_eq!(reply[1], 0x00);

    client.write_all(b"0123456789").await.unwrap();
    client.shutdown().await.unwrap();

    let response = read_to_eof(&mut client).await;
    assert_eq!(response, b"got 10 bytes");
}

#[tokio::test]
async fn test_shutdown_waits_for_live_sessions() {
    let echo = spawn_echo_server().await;
    let proxy = start_proxy(TestConfigBuilder::new().shutdown_grace_secs(5).build()).await;

    let mut client = socks5_negotiated(proxy.addr).await;
    client.write_all(&socks5_connect_ipv4(echo)).await.unwrap();
    let reply = read_socks5_reply(&mut client).await;
    assert_eq!(reply[1], 0x00);
    assert_eq!(proxy.tracker.active(), 1);

    proxy.shutdown_tx.send(true).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!proxy.handle.is_finished());

    // The live tunnel keeps working during the grace period
    client.write_all(b"still here").await.unwrap();
    let mut echoed = [0u8; 10];
    client.read_exact(&mut echoed).await.unwrap();
    assert_eq!(&echoed, b"still here");

    drop(client);
    let result = tokio::time::timeout(STEP_TIMEOUT, proxy.handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(proxy.tracker.active(), 0);
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let echo = spawn_echo_server().await;
    let proxy = start_default_proxy().await;

    let mut sessions = Vec::new();
    for i in 0..8u8 {
        let addr = proxy.addr;
        sessions.push(tokio::spawn(async move {
            let mut client = socks5_negotiated(addr).await;
            client.write_all(&socks5_connect_ipv4(echo)).await.unwrap();
            let reply = read_socks5_reply(&mut client).await;
            assert_eq!(reply[1], 0x00);

            let payload = [i; 64];
            client.write_all(&payload).await.unwrap();
            let mut echoed = [0u8; 64];
            client.read_exact(&mut echoed).await.unwrap();
            assert_eq!(echoed, payload);
        }));
    }

    for session in sessions {
        session.await.unwrap();
    }
    proxy.shutdown().await.unwrap();
}
