// tests/transport_memory.rs

//! Reference-semantics tests for the in-memory transport.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use resub::{
    // ---
    create_memory_bus,
    ClientFactory,
    Endpoint,
    HandlerPtr,
    MemoryClientFactory,
    MemoryServerFactory,
    Payload,
    PsServer,
    Topic,
};

/// Handler that forwards every delivered payload into a channel.
fn channel_handler() -> (HandlerPtr, mpsc::UnboundedReceiver<Payload>) {
    // ---
    let (tx, rx) = mpsc::unbounded_channel();
    let handler: HandlerPtr = Arc::new(move |payload: Payload| {
        let _ = tx.send(payload);
    });
    (handler, rx)
}

#[tokio::test]
async fn memory_subscribe_then_publish_delivers() {
    // ---
    // Arrange
    // ---
    let bus = create_memory_bus();
    let factory = MemoryClientFactory::new(bus);

    let endpoint = Endpoint::from("mem://local");
    let mut client = factory.create(&endpoint).await.expect("create failed");
    client.connect().await.expect("connect failed");

    let (handler, mut inbox) = channel_handler();
    client
        .subscribe(Topic::from("test.topic"), handler)
        .await
        .expect("subscribe failed");

    let payload = Payload::new(&b"hello"[..]);

    // ---
    // Act
    // ---
    client
        .publish(Topic::from("test.topic"), payload.clone())
        .await
        .expect("publish failed");

    // ---
    // Assert
    // ---
    let received = timeout(Duration::from_millis(100), inbox.recv())
        .await
        .expect("timed out waiting for payload")
        .expect("handler channel closed unexpectedly");

    assert_eq!(received, payload);
}

#[tokio::test]
async fn memory_topic_matching_is_exact() {
    // ---
    let bus = create_memory_bus();
    let factory = MemoryClientFactory::new(bus);

    let mut client = factory
        .create(&Endpoint::from("mem://local"))
        .await
        .expect("create failed");
    client.connect().await.expect("connect failed");

    let (handler, mut inbox) = channel_handler();
    client
        .subscribe(Topic::from("orders"), handler)
        .await
        .expect("subscribe failed");

    // No hierarchy, no wildcards: "orders.created" is a different topic.
    client
        .publish(Topic::from("orders.created"), Payload::new(&b"x"[..]))
        .await
        .expect("publish failed");

    assert!(inbox.try_recv().is_err(), "unexpected delivery");
}

#[tokio::test]
async fn memory_stopped_client_receives_nothing_further() {
    // ---
    let bus = create_memory_bus();
    let factory = MemoryClientFactory::new(bus.clone());
    let endpoint = Endpoint::from("mem://local");
    let topic = Topic::from("alerts");

    let mut first = factory.create(&endpoint).await.expect("create failed");
    let mut second = factory.create(&endpoint).await.expect("create failed");
    first.connect().await.expect("connect failed");
    second.connect().await.expect("connect failed");

    let (first_handler, mut first_inbox) = channel_handler();
    let (second_handler, mut second_inbox) = channel_handler();
    first
        .subscribe(topic.clone(), first_handler)
        .await
        .expect("subscribe failed");
    second
        .subscribe(topic.clone(), second_handler)
        .await
        .expect("subscribe failed");
    assert_eq!(bus.live_subscriptions(&topic).await, 2);

    // Stopping one client detaches only its own handlers.
    first.stop().await.expect("stop failed");
    assert_eq!(bus.live_subscriptions(&topic).await, 1);

    second
        .publish(topic.clone(), Payload::new(&b"disk full"[..]))
        .await
        .expect("publish failed");

    assert!(first_inbox.try_recv().is_err(), "stopped client got payload");
    assert!(second_inbox.try_recv().is_ok(), "live client got nothing");
}

#[tokio::test]
async fn memory_rejects_empty_endpoint() {
    // ---
    let bus = create_memory_bus();
    let factory = MemoryClientFactory::new(bus);

    let result = factory.create(&Endpoint::from("")).await;
    assert!(matches!(result, Err(resub::Error::InvalidEndpoint(_))));
}

#[tokio::test]
async fn memory_server_listen_blocks_until_stop() {
    // ---
    let bus = create_memory_bus();
    let server = PsServer::bind(&MemoryServerFactory::new(bus), "mem://local")
        .await
        .expect("bind failed");
    let server = Arc::new(server);

    let listener = {
        let server = server.clone();
        tokio::spawn(async move { server.start().await })
    };

    // Give the listener a chance to park.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!listener.is_finished());

    server.stop().await.expect("stop failed");

    timeout(Duration::from_millis(200), listener)
        .await
        .expect("listen did not return after stop")
        .expect("listen task panicked")
        .expect("listen returned an error");
}
