mod common;

use common::{closed_tcp_address, TcpEchoServer};
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wirecount::{context_dialer, stream_dialer, DialContext, DialError, TransferCounters};

#[tokio::test]
async fn stream_dialer_should_count_echoed_bytes() {
    let server = TcpEchoServer::start().await;
    let counters = TransferCounters::shared();
    let dialer = stream_dialer(counters.clone());

    let mut stream = dialer.dial(&server.address().to_string()).await.unwrap();
    for size in [100, 250] {
        let payload = vec![1u8; size];
        stream.write_all(&payload).await.unwrap();
        let mut echoed = vec![0u8; size];
        stream.read_exact(&mut echoed).await.unwrap();
        assert_eq!(echoed, payload);
    }

    assert_eq!(counters.bytes_written(), 350);
    assert_eq!(counters.bytes_read(), 350);
}

#[tokio::test]
async fn wrapped_stream_should_expose_inner_connection() {
    let server = TcpEchoServer::start().await;
    let dialer = stream_dialer(TransferCounters::shared());

    let stream = dialer.dial(&server.address().to_string()).await.unwrap();

    assert_eq!(stream.peer_addr().unwrap(), server.address());
    assert_eq!(stream.get_ref().peer_addr().unwrap(), server.address());
}

#[tokio::test]
async fn non_blocking_reads_and_writes_should_be_counted() {
    let server = TcpEchoServer::start().await;
    let counters = TransferCounters::shared();
    let dialer = stream_dialer(counters.clone());
    let stream = dialer.dial(&server.address().to_string()).await.unwrap();

    let payload = b"hello world";
    let written = loop {
        stream.get_ref().writable().await.unwrap();
        match stream.try_write(payload) {
            Ok(written) => break written,
            Err(error) if error.kind() == ErrorKind::WouldBlock => continue,
            Err(error) => panic!("write failed: {error}"),
        }
    };
    let mut echoed = vec![0u8; written];
    let mut read = 0;
    while read < written {
        stream.get_ref().readable().await.unwrap();
        match stream.try_read(&mut echoed[read..]) {
            Ok(0) => panic!("connection closed"),
            Ok(bytes) => read += bytes,
            Err(error) if error.kind() == ErrorKind::WouldBlock => continue,
            Err(error) => panic!("read failed: {error}"),
        }
    }

    assert_eq!(written, payload.len());
    assert_eq!(&echoed, payload);
    assert_eq!(counters.bytes_written(), payload.len() as u64);
    assert_eq!(counters.bytes_read(), payload.len() as u64);
}

#[tokio::test]
async fn stream_dialer_should_propagate_connection_error() {
    let address = closed_tcp_address().await;
    let counters = TransferCounters::shared();
    let dialer = stream_dialer(counters.clone());

    let error = dialer.dial(&address.to_string()).await.unwrap_err();

    assert!(matches!(error, DialError::Io(_)));
    assert_eq!(counters.bytes_read(), 0);
    assert_eq!(counters.bytes_written(), 0);
}

#[tokio::test]
async fn context_dialer_should_count_echoed_bytes() {
    let server = TcpEchoServer::start().await;
    let counters = TransferCounters::shared();
    let dialer = context_dialer(counters.clone());
    let context = DialContext::new().with_timeout(Duration::from_secs(5));

    let mut stream = dialer
        .dial_context(&context, "tcp", &server.address().to_string())
        .await
        .unwrap();
    stream.write_all(b"ping").await.unwrap();
    let mut echoed = [0u8; 4];
    stream.read_exact(&mut echoed).await.unwrap();

    assert_eq!(&echoed, b"ping");
    assert_eq!(counters.bytes_written(), 4);
    assert_eq!(counters.bytes_read(), 4);
}

#[tokio::test]
async fn canceled_context_should_fail_dial_without_connection() {
    let server = TcpEchoServer::start().await;
    let dialer = context_dialer(TransferCounters::shared());
    let context = DialContext::new();
    context.cancel();

    let result = dialer
        .dial_context(&context, "tcp", &server.address().to_string())
        .await;

    assert!(matches!(result, Err(DialError::Canceled)));
}

#[tokio::test]
async fn expired_context_should_fail_dial_with_deadline_exceeded() {
    let server = TcpEchoServer::start().await;
    let dialer = context_dialer(TransferCounters::shared());
    let context = DialContext::background().with_timeout(Duration::ZERO);

    let result = dialer
        .dial_context(&context, "tcp", &server.address().to_string())
        .await;

    assert!(matches!(result, Err(DialError::DeadlineExceeded)));
}

#[tokio::test]
async fn context_dialer_should_honor_address_family() {
    let server = TcpEchoServer::start().await;
    let dialer = context_dialer(TransferCounters::shared());
    let context = DialContext::background();
    let address = server.address().to_string();

    assert!(dialer.dial_context(&context, "tcp4", &address).await.is_ok());
    assert!(matches!(
        dialer.dial_context(&context, "tcp6", &address).await,
        Err(DialError::NoSuitableAddress(_))
    ));
}

#[tokio::test]
async fn context_dialer_should_reject_unknown_network() {
    let dialer = context_dialer(TransferCounters::shared());

    let result = dialer
        .dial_context(&DialContext::background(), "unix", "127.0.0.1:80")
        .await;

    assert!(matches!(result, Err(DialError::UnknownNetwork(_))));
}

#[tokio::test]
async fn context_dialer_should_propagate_connection_error() {
    let address = closed_tcp_address().await;
    let counters = TransferCounters::shared();
    let dialer = context_dialer(counters.clone());

    let result = dialer
        .dial_context(&DialContext::background(), "tcp", &address.to_string())
        .await;

    assert!(matches!(result, Err(DialError::Io(_))));
    assert_eq!(counters.snapshot().bytes_read, 0);
}

#[tokio::test]
async fn concurrent_connections_should_share_counters() {
    let server = TcpEchoServer::start().await;
    let counters = TransferCounters::shared();
    let dialer = context_dialer(counters.clone());
    let address = server.address().to_string();

    let tasks = (1..=8usize)
        .map(|id| {
            let dialer = dialer.clone();
            let address = address.clone();
            tokio::spawn(async move {
                let mut stream = dialer
                    .dial_context(&DialContext::background(), "tcp", &address)
                    .await
                    .unwrap();
                let payload = vec![id as u8; id * 100];
                stream.write_all(&payload).await.unwrap();
                let mut echoed = vec![0u8; payload.len()];
                stream.read_exact(&mut echoed).await.unwrap();
            })
        })
        .collect::<Vec<_>>();
    for task in futures::future::join_all(tasks).await {
        task.unwrap();
    }

    let expected: u64 = (1..=8u64).map(|id| id * 100).sum();
    assert_eq!(counters.bytes_written(), expected);
    assert_eq!(counters.bytes_read(), expected);
}
