use crate::{candidate, peer, settle, slot, spawn_controller};
use multicam_core::SlotHealth;
use multicam_engine::{ChannelEvent, TransportState};

#[tokio::test]
async fn channel_close_tears_down_every_live_session() {
    let h = spawn_controller(4);
    let (p1, p2) = (peer("p1"), peer("p2"));

    for (p, s) in [(p1.clone(), slot(1)), (p2.clone(), slot(2))] {
        h.events
            .send(ChannelEvent::PeerJoined { peer: p, slot: s })
            .await
            .unwrap();
    }
    h.channel.wait_for_offer(&p1, 2000).await.unwrap();
    h.channel.wait_for_offer(&p2, 2000).await.unwrap();
    assert_eq!(h.factory.created(), 2);

    h.events.send(ChannelEvent::Closed).await.unwrap();

    for handle in h.factory.handles() {
        assert!(handle.wait_until_closed(2000).await);
    }
}

#[tokio::test]
async fn relay_disruption_does_not_disturb_live_sessions() {
    let h = spawn_controller(4);
    let p1 = peer("p1");
    let s1 = slot(1);

    h.events
        .send(ChannelEvent::PeerJoined {
            peer: p1.clone(),
            slot: s1,
        })
        .await
        .unwrap();
    h.channel.wait_for_offer(&p1, 2000).await.unwrap();
    h.events
        .send(ChannelEvent::Answer {
            peer: p1.clone(),
            slot: s1,
            sdp: "answer-sdp".to_owned(),
        })
        .await
        .unwrap();

    let handle = &h.factory.handles()[0];
    assert!(handle.wait_for_applied(2, 2000).await);
    handle.emit_state(TransportState::Connected).await;
    assert!(h.sink.wait_for_health(s1, SlotHealth::Connected, 2000).await);

    // Silence after a relay disruption means "still negotiating": the
    // session neither closes nor changes health.
    h.events.send(ChannelEvent::Disrupted).await.unwrap();
    settle().await;
    assert!(!handle.is_closed());
    assert_eq!(
        h.sink.statuses_for(s1).last().map(|s| s.health),
        Some(SlotHealth::Connected)
    );

    h.events.send(ChannelEvent::Reconnected).await.unwrap();
    settle().await;
    assert!(!handle.is_closed());

    // The session is still fully operational after reconnection.
    h.events
        .send(ChannelEvent::Candidate {
            peer: p1.clone(),
            slot: s1,
            candidate: candidate("post-reconnect"),
        })
        .await
        .unwrap();
    assert!(handle.wait_for_applied(3, 2000).await);
    assert!(handle.applied()[2].contains("post-reconnect"));
}
