use std::time::Duration;

use dav_trust::{FailureKind, OperationKind, OperationRequest, TrustMode, WebDavClient};

use crate::support::{MockResponse, MockServer, ca_signed_identity, self_signed_identity};

#[tokio::test]
async fn test_default_mode_rejects_self_signed_server() {
    let (identity, _) = self_signed_identity();
    let server = MockServer::start_tls(identity.server_config(), |_| MockResponse::status(207)).await;
    let client = WebDavClient::new();

    let err = client
        .collection_exists(&server.url("/dav/"), "u", "p")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Transport);
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_insecure_mode_accepts_self_signed_server() {
    let (identity, _) = self_signed_identity();
    let server = MockServer::start_tls(identity.server_config(), |_| MockResponse::status(207)).await;
    let client = WebDavClient::new();

    let ack = client.set_insecure_mode(true);
    assert_eq!(ack.message, "insecure mode set to true");
    assert_eq!(client.trust_mode(), TrustMode::InsecureTrustAll);

    client
        .collection_exists(&server.url("/dav/"), "u", "p")
        .await
        .expect("insecure mode should accept any certificate");
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_pinned_self_signed_leaf_is_trusted() {
    let (identity, pem) = self_signed_identity();
    let server = MockServer::start_tls(identity.server_config(), |_| {
        MockResponse::status(200).with_body("pinned")
    })
    .await;
    let client = WebDavClient::new();

    client
        .upload_trusted_certificate(pem.as_bytes())
        .expect("PEM certificate should be accepted");
    assert!(matches!(client.trust_mode(), TrustMode::PinnedAuthority(_)));

    let body = client
        .download_file(&server.url("/dav/file.txt"), "u", "p")
        .await
        .expect("pinned leaf should be trusted");
    assert_eq!(&body[..], b"pinned");
}

#[tokio::test]
async fn test_pinned_authority_ignores_hostname_mismatch() {
    // Leaf is issued for dav.internal, the client connects to 127.0.0.1.
    let (identity, ca_der) = ca_signed_identity();
    let server = MockServer::start_tls(identity.server_config(), |_| MockResponse::status(201)).await;
    let client = WebDavClient::new();

    client
        .set_pinned_authority(&ca_der)
        .expect("DER certificate should be accepted");

    client
        .create_collection(&server.url("/dav/new/"), "u", "p")
        .await
        .expect("chain rooted at the pinned CA should be trusted");
}

#[tokio::test]
async fn test_pinned_authority_rejects_other_chains() {
    let (identity, _) = self_signed_identity();
    let (_, unrelated_ca) = ca_signed_identity();
    let server = MockServer::start_tls(identity.server_config(), |_| MockResponse::status(200)).await;
    let client = WebDavClient::new();

    client.set_pinned_authority(&unrelated_ca).expect("valid CA");

    let err = client
        .download_file(&server.url("/dav/file.txt"), "u", "p")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
}

#[tokio::test]
async fn test_insecure_off_falls_back_to_pinned_authority() {
    let (identity, pem) = self_signed_identity();
    let server = MockServer::start_tls(identity.server_config(), |_| MockResponse::status(200)).await;
    let client = WebDavClient::new();

    client.set_pinned_authority(pem.as_bytes()).expect("valid PEM");
    client.set_insecure_mode(true);
    client.set_insecure_mode(false);
    assert!(matches!(client.trust_mode(), TrustMode::PinnedAuthority(_)));

    client
        .download_file(&server.url("/dav/file.txt"), "u", "p")
        .await
        .expect("pinned authority should be back in force");

    client.clear_pinned_authority();
    assert_eq!(client.trust_mode(), TrustMode::Default);
    let err = client
        .download_file(&server.url("/dav/file.txt"), "u", "p")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
}

#[tokio::test]
async fn test_trust_change_only_affects_later_dispatches() {
    let (identity, _) = self_signed_identity();
    let server = MockServer::start_tls(identity.server_config(), |req| {
        if req.path == "/slow" {
            MockResponse::status(200)
                .with_body("slow")
                .with_delay(Duration::from_millis(500))
        } else {
            MockResponse::status(200).with_body("fast")
        }
    })
    .await;
    let client = WebDavClient::new();
    client.set_insecure_mode(true);

    let in_flight = client
        .dispatch(
            OperationKind::DownloadFile,
            OperationRequest::new(&server.url("/slow"), "u", "p"),
        )
        .expect("valid request");
    server.wait_for_requests(1).await;

    client.set_insecure_mode(false);
    assert_eq!(client.trust_mode(), TrustMode::Default);

    let payload = in_flight
        .await
        .expect("in-flight operation keeps its transport");
    assert_eq!(&payload.into_bytes()[..], b"slow");

    let err = client
        .download_file(&server.url("/fast"), "u", "p")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_invalid_certificate_leaves_mode_unchanged() {
    let (_, pem) = self_signed_identity();
    let client = WebDavClient::new();
    client.set_pinned_authority(pem.as_bytes()).expect("valid PEM");
    let before = client.trust_mode();

    let err = client
        .upload_trusted_certificate(b"not a certificate")
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Certificate);
    assert_eq!(client.trust_mode(), before);
}
