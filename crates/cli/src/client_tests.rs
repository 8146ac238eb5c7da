use super::*;
use jm_wire::Response;
use tokio::net::UnixListener;

#[tokio::test]
async fn call_round_trips_through_a_fake_daemon() {
    let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let socket_path = tmp.path().join("fake.sock");
    let listener = UnixListener::bind(&socket_path).unwrap_or_else(|e| panic!("bind: {e}"));

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap_or_else(|e| panic!("accept: {e}"));
        let payload = jm_wire::read_message(&mut stream).await.unwrap_or_else(|e| panic!("{e}"));
        let request: Request = serde_json::from_slice(&payload).unwrap_or_else(|e| panic!("{e}"));
        let response = Response::success(request.id, serde_json::json!({"echo": request.method}));
        let encoded = serde_json::to_vec(&response).unwrap_or_else(|e| panic!("{e}"));
        jm_wire::write_message(&mut stream, &encoded).await.unwrap_or_else(|e| panic!("{e}"));
    });

    let client = DaemonClient::new(socket_path);
    let result = client.call("list-pipelines", serde_json::json!({})).await.unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(result, serde_json::json!({"echo": "list-pipelines"}));
}

#[tokio::test]
async fn call_surfaces_an_rpc_error() {
    let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let socket_path = tmp.path().join("fake.sock");
    let listener = UnixListener::bind(&socket_path).unwrap_or_else(|e| panic!("bind: {e}"));

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap_or_else(|e| panic!("accept: {e}"));
        let payload = jm_wire::read_message(&mut stream).await.unwrap_or_else(|e| panic!("{e}"));
        let request: Request = serde_json::from_slice(&payload).unwrap_or_else(|e| panic!("{e}"));
        let response = Response::error(Some(request.id), jm_wire::ErrorData::new(jm_wire::INVALID_PARAMS, "no such pipeline"));
        let encoded = serde_json::to_vec(&response).unwrap_or_else(|e| panic!("{e}"));
        jm_wire::write_message(&mut stream, &encoded).await.unwrap_or_else(|e| panic!("{e}"));
    });

    let client = DaemonClient::new(socket_path);
    let err = client.call("cancel-pipeline", serde_json::json!({})).await.unwrap_err();
    assert!(matches!(err, ClientError::Rpc { .. }));
}

#[tokio::test]
async fn connecting_to_a_missing_socket_is_a_connect_error() {
    let client = DaemonClient::new(PathBuf::from("/tmp/definitely-not-a-real-jermd.sock"));
    let err = client.call("list-pipelines", serde_json::json!({})).await.unwrap_err();
    assert!(matches!(err, ClientError::Connect { .. }));
}
