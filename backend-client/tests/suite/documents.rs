use pretty_assertions::assert_eq;
use ragpilot_backend_client::{BackendClient, BackendError};
use ragpilot_retrieval::DocId;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&format!("{}/api", server.uri())).unwrap()
}

#[test_log::test(tokio::test)]
async fn list_documents_uses_get_when_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rpc/list_documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "s3_key": "policies/travel.pdf", "created_at": "2024-05-02T10:00:00Z"},
            {"id": 2, "s3_key": "policies/leave.pdf", "created_at": "2024-05-03 09:15:00"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/list_documents"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let docs = client(&server).list_documents().await.unwrap();

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, DocId::from(1));
    assert_eq!(docs[0].display_key, "policies/travel.pdf");
    assert!(docs[0].created_at.is_some());
    assert!(docs[1].created_at.is_some());
}

#[test_log::test(tokio::test)]
async fn list_documents_falls_back_to_post() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rpc/list_documents"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/list_documents"))
        .and(body_json(json!({})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": "9", "s3_key": "handbook.pdf"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let docs = client(&server).list_documents().await.unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, DocId::from(9));
    assert_eq!(docs[0].created_at, None);
}

#[test_log::test(tokio::test)]
async fn list_documents_reports_the_post_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rpc/list_documents"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/list_documents"))
        .respond_with(ResponseTemplate::new(503).set_body_string("db offline"))
        .mount(&server)
        .await;

    let err = client(&server).list_documents().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(
        err.to_string(),
        "list documents failed: HTTP 503 db offline"
    );
}

#[test_log::test(tokio::test)]
async fn delete_document_sends_numeric_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/delete_document"))
        .and(body_json(json!({"p_id": 7})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .delete_document(&DocId::from("7"))
        .await
        .unwrap();
}

#[test_log::test(tokio::test)]
async fn delete_all_documents_posts_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/delete_all_documents"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete_all_documents().await.unwrap();
}

#[test_log::test(tokio::test)]
async fn delete_failure_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/delete_document"))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&server)
        .await;

    let err = client(&server)
        .delete_document(&DocId::from(3))
        .await
        .unwrap_err();
    assert!(
        matches!(err, BackendError::Transport { status: 403, ref body, .. } if body == "permission denied"),
        "{err:?}"
    );
}
