use ember_dns_application::cache::ResolverCaches;
use ember_dns_application::use_cases::ResolveQueryUseCase;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{rdata, DNSClass, Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::UdpSocket;

use ember_dns_infrastructure::dns::{DnsServer, UdpForwarder};
use ember_dns_infrastructure::persistence::JsonSnapshotStore;

fn encode(message: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}

fn a_query(id: u16, domain: &str) -> Vec<u8> {
    let mut query = Query::new();
    query.set_name(Name::from_str(domain).unwrap());
    query.set_query_type(RecordType::A);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);
    encode(&message)
}

/// Mock upstream answering every query with one canned A record.
async fn spawn_answering_upstream() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    tokio::spawn(async move {
        let mut buf = vec![0u8; 4096];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                return;
            };
            let request = Message::from_vec(&buf[..len]).unwrap();

            let mut response =
                Message::new(request.id(), MessageType::Response, request.op_code());
            if let Some(query) = request.queries().first() {
                response.add_answer(Record::from_rdata(
                    query.name().clone(),
                    300,
                    RData::A(rdata::A("192.0.2.1".parse().unwrap())),
                ));
                response.add_query(query.clone());
            }
            let _ = socket.send_to(&encode(&response), peer).await;
        }
    });

    addr
}

/// Mock upstream that receives and never answers.
async fn spawn_silent_upstream() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    tokio::spawn(async move {
        let mut buf = vec![0u8; 4096];
        loop {
            if socket.recv_from(&mut buf).await.is_err() {
                return;
            }
        }
    });

    addr
}

/// Full resolver stack on an ephemeral port: real server loop, real
/// forwarder, snapshots in a temp directory, empty caches.
async fn start_server(upstream: SocketAddr, timeout: Duration) -> (SocketAddr, TempDir) {
    let dir = TempDir::new().unwrap();
    let snapshots = Arc::new(JsonSnapshotStore::new(dir.path()));
    let caches = Arc::new(ResolverCaches::empty());
    let forwarder = Arc::new(UdpForwarder::new(upstream, timeout));
    let engine = Arc::new(ResolveQueryUseCase::new(forwarder, snapshots, caches));

    let server = DnsServer::bind("127.0.0.1:0".parse().unwrap(), engine)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move { server.run().await });

    (addr, dir)
}

async fn expect_no_reply(client: &UdpSocket) {
    let mut buf = vec![0u8; 4096];
    let received = tokio::time::timeout(Duration::from_millis(300), client.recv(&mut buf)).await;
    assert!(received.is_err(), "expected silence, got a datagram");
}

#[tokio::test]
async fn test_malformed_datagram_gets_no_reply_and_server_keeps_serving() {
    let upstream = spawn_answering_upstream().await;
    let (server_addr, _dir) = start_server(upstream, Duration::from_secs(2)).await;

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.connect(server_addr).await.unwrap();

    // Garbage is dropped without a response.
    client.send(&[0xff, 0x00, 0xab]).await.unwrap();
    expect_no_reply(&client).await;

    // The loop is still alive: a valid query gets a real answer.
    client.send(&a_query(0x4242, "example.com.")).await.unwrap();
    let mut buf = vec![0u8; 4096];
    let len = tokio::time::timeout(Duration::from_secs(2), client.recv(&mut buf))
        .await
        .unwrap()
        .unwrap();

    let response = Message::from_vec(&buf[..len]).unwrap();
    assert_eq!(response.id(), 0x4242);
    assert_eq!(response.message_type(), MessageType::Response);
    assert_eq!(response.answers().len(), 1);
}

#[tokio::test]
async fn test_forwarding_failure_sends_no_reply_to_the_requester() {
    let upstream = spawn_silent_upstream().await;
    let (server_addr, _dir) = start_server(upstream, Duration::from_millis(100)).await;

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.connect(server_addr).await.unwrap();

    client.send(&a_query(0x0007, "example.com.")).await.unwrap();
    expect_no_reply(&client).await;
}

#[tokio::test]
async fn test_second_query_is_answered_from_cache_without_upstream() {
    let upstream = spawn_answering_upstream().await;
    let (server_addr, _dir) = start_server(upstream, Duration::from_secs(2)).await;

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.connect(server_addr).await.unwrap();
    let mut buf = vec![0u8; 4096];

    client.send(&a_query(0x0001, "example.com.")).await.unwrap();
    let len = tokio::time::timeout(Duration::from_secs(2), client.recv(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(Message::from_vec(&buf[..len]).unwrap().id(), 0x0001);

    // The repeat is served from cache, so its id comes from the new request
    // header rather than any relayed upstream message.
    client.send(&a_query(0x0002, "example.com.")).await.unwrap();
    let len = tokio::time::timeout(Duration::from_secs(2), client.recv(&mut buf))
        .await
        .unwrap()
        .unwrap();

    let response = Message::from_vec(&buf[..len]).unwrap();
    assert_eq!(response.id(), 0x0002);
    assert_eq!(response.answers().len(), 1);
    assert!(matches!(response.answers()[0].data(), RData::A(_)));
    let ttl = response.answers()[0].ttl();
    assert!(ttl <= 300, "decayed ttl = {ttl}");
}
