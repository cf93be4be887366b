use super::*;

#[test]
fn app_state_new_has_no_clients() {
    let state = test_helpers::test_app_state();
    assert!(state.clients.try_read().unwrap().is_empty());
    assert!(!state.config.require_sign_in);
}

#[test]
fn connected_client_starts_anonymous() {
    let (tx, _rx) = mpsc::channel(1);
    let client = ConnectedClient::new(tx);
    assert!(client.name.is_none());
    assert!(!client.is_signed_in());
}

#[tokio::test]
async fn clones_share_the_registry() {
    let state = test_helpers::test_app_state();
    let copy = state.clone();

    let (client_id, _rx) = test_helpers::register_client(&state, 4).await;

    assert!(copy.clients.read().await.contains_key(&client_id));
}

#[test]
fn gated_helper_sets_flag() {
    let state = test_helpers::test_app_state_gated();
    assert!(state.config.require_sign_in);
}
