use crate::utils::FakeMediaProvider;
use crate::{candidate, peer, settle, slot, spawn_source};
use multicam_core::SlotHealth;
use multicam_engine::ChannelEvent;
use std::sync::Arc;

#[tokio::test]
async fn inbound_offer_produces_an_answer_with_local_media() {
    let media = Arc::new(FakeMediaProvider::new());
    let h = spawn_source(slot(2), media.clone());
    let ctrl = peer("ctrl");

    h.events
        .send(ChannelEvent::Offer {
            peer: ctrl.clone(),
            slot: slot(2),
            sdp: "offer-sdp".to_owned(),
        })
        .await
        .unwrap();

    let answer = h.channel.wait_for_answer(&ctrl, 2000).await.unwrap();
    assert_eq!(answer, "answer-to-ctrl");
    assert_eq!(media.acquisitions(), 1);

    let handles = h.factory.handles();
    assert_eq!(handles.len(), 1);
    assert!(handles[0].produced_media);
    assert_eq!(handles[0].applied()[0], "accept-offer:offer-sdp");

    assert!(h.sink.wait_for_health(slot(2), SlotHealth::Waiting, 2000).await);
}

#[tokio::test]
async fn candidate_before_any_offer_is_discarded() {
    let h = spawn_source(slot(1), Arc::new(FakeMediaProvider::new()));
    let ctrl = peer("ctrl");

    h.events
        .send(ChannelEvent::Candidate {
            peer: ctrl.clone(),
            slot: slot(1),
            candidate: candidate("premature"),
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(h.factory.created(), 0);

    // Once the offer lands, candidates apply straight away.
    h.events
        .send(ChannelEvent::Offer {
            peer: ctrl.clone(),
            slot: slot(1),
            sdp: "offer-sdp".to_owned(),
        })
        .await
        .unwrap();
    h.channel.wait_for_answer(&ctrl, 2000).await.unwrap();

    h.events
        .send(ChannelEvent::Candidate {
            peer: ctrl.clone(),
            slot: slot(1),
            candidate: candidate("timely"),
        })
        .await
        .unwrap();

    let handle = &h.factory.handles()[0];
    assert!(handle.wait_for_applied(2, 2000).await);
    assert!(handle.applied()[1].contains("timely"));
}

#[tokio::test]
async fn renegotiation_offer_replaces_the_session_and_reuses_media() {
    let media = Arc::new(FakeMediaProvider::new());
    let h = spawn_source(slot(3), media.clone());
    let ctrl = peer("ctrl");

    for _ in 0..2 {
        h.events
            .send(ChannelEvent::Offer {
                peer: ctrl.clone(),
                slot: slot(3),
                sdp: "offer-sdp".to_owned(),
            })
            .await
            .unwrap();
    }

    assert!(h.factory.wait_for_created(2, 2000).await);
    let handles = h.factory.handles();
    assert!(handles[0].wait_until_closed(2000).await);
    assert!(!handles[1].is_closed());

    settle().await;
    assert_eq!(h.channel.answers_for(&ctrl).len(), 2);
    // Tracks are acquired once and reused across renegotiations.
    assert_eq!(media.acquisitions(), 1);
}

#[tokio::test]
async fn media_acquisition_failure_is_terminal() {
    let media = Arc::new(FakeMediaProvider::failing());
    let h = spawn_source(slot(2), media.clone());
    let ctrl = peer("ctrl");

    h.events
        .send(ChannelEvent::Offer {
            peer: ctrl.clone(),
            slot: slot(2),
            sdp: "offer-sdp".to_owned(),
        })
        .await
        .unwrap();

    assert!(h.sink.wait_for_health(slot(2), SlotHealth::Failed, 2000).await);
    let last = h.sink.statuses_for(slot(2)).last().cloned().unwrap();
    assert!(last.message.contains("denied"), "{}", last.message);
    assert_eq!(h.factory.created(), 0);
    assert!(h.channel.answers_for(&ctrl).is_empty());

    // Further offers are ignored without touching the device again.
    h.events
        .send(ChannelEvent::Offer {
            peer: ctrl.clone(),
            slot: slot(2),
            sdp: "offer-sdp".to_owned(),
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(h.factory.created(), 0);
    assert_eq!(media.acquisitions(), 1);
}

#[tokio::test]
async fn offer_with_a_foreign_slot_hint_uses_the_sources_own_slot() {
    let h = spawn_source(slot(2), Arc::new(FakeMediaProvider::new()));
    let ctrl = peer("ctrl");

    h.events
        .send(ChannelEvent::Offer {
            peer: ctrl.clone(),
            slot: slot(4),
            sdp: "offer-sdp".to_owned(),
        })
        .await
        .unwrap();
    h.channel.wait_for_answer(&ctrl, 2000).await.unwrap();

    assert!(h.sink.wait_for_health(slot(2), SlotHealth::Waiting, 2000).await);
    assert!(h.sink.statuses_for(slot(4)).is_empty());
}

#[tokio::test]
async fn controller_join_notice_alone_opens_no_transport() {
    let h = spawn_source(slot(1), Arc::new(FakeMediaProvider::new()));

    h.events
        .send(ChannelEvent::PeerJoined {
            peer: peer("ctrl"),
            slot: slot(1),
        })
        .await
        .unwrap();
    settle().await;

    assert_eq!(h.factory.created(), 0);
    assert!(h.channel.signals().is_empty());
}
