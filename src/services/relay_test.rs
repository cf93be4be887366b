use super::*;
use crate::state::test_helpers;
use frames::{EVENT_MESSAGE, Status};
use tokio::time::{Duration, timeout};

async fn recv(rx: &mut mpsc::Receiver<Frame>) -> Frame {
    timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("broadcast receive timed out")
        .expect("broadcast channel closed unexpectedly")
}

// =============================================================================
// join / part
// =============================================================================

#[tokio::test]
async fn join_and_part_update_registry() {
    let state = test_helpers::test_app_state();
    let client_id = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel(4);

    join(&state, client_id, tx).await;
    assert_eq!(client_count(&state).await, 1);

    let removed = part(&state, client_id).await;
    assert!(removed.is_some());
    assert_eq!(client_count(&state).await, 0);
}

#[tokio::test]
async fn part_unknown_client_is_noop() {
    let state = test_helpers::test_app_state();
    assert!(part(&state, Uuid::new_v4()).await.is_none());
}

// =============================================================================
// sign_in
// =============================================================================

#[tokio::test]
async fn sign_in_records_name_and_returns_previous() {
    let state = test_helpers::test_app_state();
    let (client_id, _rx) = test_helpers::register_client(&state, 4).await;

    assert_eq!(sign_in(&state, client_id, "Aiko").await, Ok(None));
    assert_eq!(sign_in(&state, client_id, "Ren").await, Ok(Some("Aiko".into())));

    let clients = state.clients.read().await;
    assert_eq!(clients[&client_id].name.as_deref(), Some("Ren"));
}

#[tokio::test]
async fn sign_in_rejects_blank_name() {
    let state = test_helpers::test_app_state();
    let (client_id, _rx) = test_helpers::register_client(&state, 4).await;

    let err = sign_in(&state, client_id, "   ").await.unwrap_err();
    assert_eq!(err.error_code(), "E_INVALID_PAYLOAD");
}

#[tokio::test]
async fn sign_in_unknown_client_fails() {
    let state = test_helpers::test_app_state();
    let missing = Uuid::new_v4();
    assert_eq!(sign_in(&state, missing, "Aiko").await, Err(RelayError::NotConnected(missing)));
}

// =============================================================================
// relay_message
// =============================================================================

#[tokio::test]
async fn message_reaches_every_client_including_sender() {
    let state = test_helpers::test_app_state();
    let (sender, mut rx_sender) = test_helpers::register_client(&state, 4).await;
    let (_other, mut rx_other) = test_helpers::register_client(&state, 4).await;

    let delivered = relay_message(&state, sender, "hello").await.unwrap();
    assert_eq!(delivered, 2);

    for rx in [&mut rx_sender, &mut rx_other] {
        let frame = recv(rx).await;
        assert_eq!(frame.syscall, EVENT_MESSAGE);
        assert_eq!(frame.status, Status::Request);
        assert_eq!(frame.content(), Some("hello"));
        assert!(frame.from.is_none());
    }
}

#[tokio::test]
async fn message_is_stamped_with_signed_in_name() {
    let state = test_helpers::test_app_state();
    let (sender, mut rx) = test_helpers::register_client(&state, 4).await;
    sign_in(&state, sender, "Aiko").await.unwrap();

    relay_message(&state, sender, "hi").await.unwrap();

    assert_eq!(recv(&mut rx).await.from.as_deref(), Some("Aiko"));
}

#[tokio::test]
async fn content_is_relayed_verbatim() {
    let state = test_helpers::test_app_state();
    let (sender, mut rx) = test_helpers::register_client(&state, 4).await;

    relay_message(&state, sender, "  spaced  ").await.unwrap();

    assert_eq!(recv(&mut rx).await.content(), Some("  spaced  "));
}

#[tokio::test]
async fn gated_relay_rejects_until_sign_in() {
    let state = test_helpers::test_app_state_gated();
    let (sender, mut rx) = test_helpers::register_client(&state, 4).await;

    assert_eq!(relay_message(&state, sender, "early").await, Err(RelayError::NotSignedIn));
    assert!(rx.try_recv().is_err());

    sign_in(&state, sender, "Aiko").await.unwrap();
    assert_eq!(relay_message(&state, sender, "late").await, Ok(1));
    assert_eq!(recv(&mut rx).await.content(), Some("late"));
}

#[tokio::test]
async fn repeated_sign_in_does_not_duplicate_broadcasts() {
    let state = test_helpers::test_app_state_gated();
    let (sender, mut rx) = test_helpers::register_client(&state, 4).await;
    sign_in(&state, sender, "Aiko").await.unwrap();
    sign_in(&state, sender, "Aiko").await.unwrap();

    relay_message(&state, sender, "once").await.unwrap();

    assert_eq!(recv(&mut rx).await.content(), Some("once"));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn unregistered_sender_is_rejected() {
    let state = test_helpers::test_app_state();
    let missing = Uuid::new_v4();
    assert_eq!(relay_message(&state, missing, "x").await, Err(RelayError::NotConnected(missing)));
}

// =============================================================================
// broadcast
// =============================================================================

#[tokio::test]
async fn broadcast_skips_full_channel_without_affecting_others() {
    let state = test_helpers::test_app_state();
    let (_slow, mut rx_slow) = test_helpers::register_client(&state, 1).await;
    let (_fast, mut rx_fast) = test_helpers::register_client(&state, 4).await;

    assert_eq!(broadcast(&state, &Frame::message("one")).await, 2);
    assert_eq!(broadcast(&state, &Frame::message("two")).await, 1);

    assert_eq!(recv(&mut rx_fast).await.content(), Some("one"));
    assert_eq!(recv(&mut rx_fast).await.content(), Some("two"));
    assert_eq!(recv(&mut rx_slow).await.content(), Some("one"));
    assert!(rx_slow.try_recv().is_err());
}

#[tokio::test]
async fn broadcast_skips_closed_channel() {
    let state = test_helpers::test_app_state();
    let (_gone, rx_gone) = test_helpers::register_client(&state, 4).await;
    let (_live, mut rx_live) = test_helpers::register_client(&state, 4).await;
    drop(rx_gone);

    assert_eq!(broadcast(&state, &Frame::message("x")).await, 1);
    assert_eq!(recv(&mut rx_live).await.content(), Some("x"));
}

#[test]
fn error_codes_are_stable() {
    assert_eq!(RelayError::NotSignedIn.error_code(), "E_NOT_SIGNED_IN");
    assert_eq!(RelayError::InvalidPayload("x").error_code(), "E_INVALID_PAYLOAD");
    assert_eq!(RelayError::UnknownEvent("x".into()).error_code(), "E_UNKNOWN_EVENT");
    assert_eq!(RelayError::NotConnected(Uuid::nil()).error_code(), "E_NOT_CONNECTED");
    assert!(!RelayError::NotSignedIn.retryable());
}
