mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{pacific_local, wait_for_count};
use serde_json::Value;
use sismo_server::hub::{Envelope, Hub, Payload};
use tokio::sync::mpsc;

async fn recv_json(queue: &mut mpsc::Receiver<Payload>) -> Value {
    let payload = tokio::time::timeout(Duration::from_secs(2), queue.recv())
        .await
        .expect("timed out waiting for payload")
        .expect("queue closed");
    serde_json::from_str(&payload).unwrap()
}

#[test]
fn envelope_wraps_event_under_type_and_data() {
    let event = pacific_local("us7000abcd");
    let payload = Envelope::NewEarthquake(&event).to_payload().unwrap();
    let json: Value = serde_json::from_str(&payload).unwrap();

    assert_eq!(json["type"], "new_earthquake");
    assert_eq!(json["data"]["id"], "us7000abcd");
    assert_eq!(json["data"]["oceano"], "Pacifico");
    assert_eq!(json["data"]["oceanoRegion"], "local");
}

#[tokio::test]
async fn full_queue_evicts_only_the_slow_session() {
    let (hub, _task) = Hub::spawn(4);

    // A slow session whose single slot is already taken.
    let (slow_tx, mut slow_rx) = mpsc::channel::<Payload>(1);
    slow_tx.try_send(Payload::from("backlog")).unwrap();
    hub.register(uuid::Uuid::new_v4(), slow_tx);

    let mut fast_a = hub.subscribe();
    let mut fast_b = hub.subscribe();
    wait_for_count(&hub, 3).await;

    hub.broadcast(&pacific_local("evt-1"));
    wait_for_count(&hub, 2).await;

    assert_eq!(recv_json(&mut fast_a.queue).await["data"]["id"], "evt-1");
    assert_eq!(recv_json(&mut fast_b.queue).await["data"]["id"], "evt-1");

    // The backlog is still readable, then the queue reports closed.
    assert_eq!(slow_rx.recv().await.as_deref(), Some("backlog"));
    assert!(slow_rx.recv().await.is_none());

    // Survivors keep receiving.
    hub.broadcast(&pacific_local("evt-2"));
    assert_eq!(recv_json(&mut fast_a.queue).await["data"]["id"], "evt-2");
    assert_eq!(recv_json(&mut fast_b.queue).await["data"]["id"], "evt-2");
}

#[tokio::test]
async fn each_session_receives_in_broadcast_order() {
    let (hub, _task) = Hub::spawn(16);
    let mut sub = hub.subscribe();

    for i in 0..5 {
        hub.broadcast(&pacific_local(&format!("evt-{i}")));
    }

    for i in 0..5 {
        let json = recv_json(&mut sub.queue).await;
        assert_eq!(json["data"]["id"], format!("evt-{i}"));
    }
}

#[tokio::test]
async fn unregister_closes_queue_and_is_idempotent() {
    let (hub, _task) = Hub::spawn(4);
    let mut sub = hub.subscribe();
    wait_for_count(&hub, 1).await;

    hub.unregister(sub.id);
    hub.unregister(sub.id);
    hub.unregister(uuid::Uuid::new_v4());
    wait_for_count(&hub, 0).await;

    assert!(sub.queue.recv().await.is_none());
}

#[tokio::test]
async fn broadcast_without_sessions_is_a_no_op() {
    let (hub, _task) = Hub::spawn(4);
    hub.broadcast(&pacific_local("nobody-listening"));

    let mut sub = hub.subscribe();
    wait_for_count(&hub, 1).await;
    hub.broadcast_payload(Payload::from("later"));

    // Only messages broadcast after registration are delivered.
    let got = tokio::time::timeout(Duration::from_secs(2), sub.queue.recv())
        .await
        .unwrap();
    assert_eq!(got.as_deref(), Some("later"));
}

#[tokio::test]
async fn concurrent_registration_is_serialized() {
    let (hub, _task) = Hub::spawn(4);

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let hub = hub.clone();
            tokio::spawn(async move { hub.subscribe() })
        })
        .collect();

    let mut subs = Vec::new();
    for handle in handles {
        subs.push(handle.await.unwrap());
    }
    wait_for_count(&hub, 50).await;

    hub.broadcast_payload(Arc::from("hello"));
    for sub in &mut subs {
        assert_eq!(sub.queue.recv().await.as_deref(), Some("hello"));
    }
}

#[tokio::test]
async fn shutdown_closes_every_queue_and_stops_the_task() {
    let (hub, task) = Hub::spawn(4);
    let mut a = hub.subscribe();
    let mut b = hub.subscribe();
    hub.broadcast_payload(Payload::from("before-shutdown"));
    hub.shutdown();

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("control task did not stop")
        .unwrap();

    assert_eq!(hub.connected_count(), 0);
    for sub in [&mut a, &mut b] {
        assert_eq!(sub.queue.recv().await.as_deref(), Some("before-shutdown"));
        assert!(sub.queue.recv().await.is_none());
    }

    // Commands after shutdown are ignored.
    hub.broadcast(&pacific_local("after"));
    let late = hub.subscribe();
    assert_eq!(hub.connected_count(), 0);
    drop(late);
}
