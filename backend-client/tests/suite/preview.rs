use pretty_assertions::assert_eq;
use ragpilot_backend_client::{BackendClient, PreviewSession};
use ragpilot_retrieval::{RetrievalMode, RetrievalSettings, WeightPair};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_documents(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/rpc/list_documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "s3_key": "travel.pdf"},
            {"id": 2, "s3_key": "leave.pdf"}
        ])))
        .mount(server)
        .await;
}

fn session(server: &MockServer) -> PreviewSession {
    PreviewSession::new(BackendClient::new(&format!("{}/api", server.uri())).unwrap())
}

#[test_log::test(tokio::test)]
async fn preview_labels_and_orders_rows() {
    let server = MockServer::start().await;
    mount_documents(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"doc_id": 2, "seq": 4, "chunk": "Leave   accrues\nmonthly.", "distance": 0.4},
            {"doc_id": 1, "seq": 0, "chunk": "Book travel early.", "distance": 0.1},
            {"doc_id": 8, "seq": 1, "chunk": "Orphaned chunk.", "distance": 0.9}
        ])))
        .mount(&server)
        .await;

    let settings = RetrievalSettings {
        threshold: Some(0.5),
        ..Default::default()
    };
    let preview = session(&server)
        .preview("travel booking", &settings)
        .await
        .unwrap()
        .expect("only preview in flight");

    assert_eq!(preview.mode, RetrievalMode::Semantic);
    assert_eq!(preview.weights, None);
    let labels: Vec<&str> = preview.rows.iter().map(|row| row.label.as_str()).collect();
    assert_eq!(labels, vec!["travel.pdf", "leave.pdf"]);
    assert_eq!(preview.rows[0].rank, 1);
    assert_eq!(preview.rows[1].snippet, "Leave accrues monthly.");
}

#[test_log::test(tokio::test)]
async fn preview_reports_effective_hybrid_weights() {
    let server = MockServer::start().await;
    mount_documents(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks_hybrid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let settings = RetrievalSettings {
        mode: RetrievalMode::Hybrid,
        smart: false,
        w_lex: 0.4,
        w_sem: 0.6,
        ..Default::default()
    };
    let preview = session(&server)
        .preview("reimbursement process for conferences", &settings)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(preview.weights, Some(WeightPair::new(0.4, 0.6)));
    assert!(preview.rows.is_empty());
}

#[test_log::test(tokio::test)]
async fn listing_failure_falls_back_to_placeholder_labels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rpc/list_documents"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/list_documents"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"doc_id": 5, "seq": 0, "chunk": "Dress code.", "distance": 0.2},
            {"seq": 1, "chunk": "No document id.", "distance": 0.3}
        ])))
        .mount(&server)
        .await;

    let preview = session(&server)
        .preview("dress code", &RetrievalSettings::default())
        .await
        .unwrap()
        .unwrap();

    let labels: Vec<&str> = preview.rows.iter().map(|row| row.label.as_str()).collect();
    assert_eq!(labels, vec!["doc 5", "doc unknown"]);
}

#[test_log::test(tokio::test)]
async fn superseded_preview_is_discarded() {
    let server = MockServer::start().await;
    mount_documents(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks"))
        .and(body_partial_json(json!({"p_query": "slow"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(json!([{"doc_id": 1, "seq": 0, "chunk": "stale", "distance": 0.1}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks"))
        .and(body_partial_json(json!({"p_query": "fast"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"doc_id": 2, "seq": 0, "chunk": "fresh", "distance": 0.1}])),
        )
        .mount(&server)
        .await;

    let session = session(&server);
    let settings = RetrievalSettings::default();
    let (slow, fast) = tokio::join!(
        session.preview("slow", &settings),
        session.preview("fast", &settings)
    );

    assert_eq!(slow.unwrap(), None);
    let fast = fast.unwrap().expect("latest preview is kept");
    assert_eq!(fast.rows[0].snippet, "fresh");
    assert_eq!(fast.generation.get(), 2);
}

#[test_log::test(tokio::test)]
async fn superseded_failure_is_discarded() {
    let server = MockServer::start().await;
    mount_documents(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks"))
        .and(body_partial_json(json!({"p_query": "slow"})))
        .respond_with(
            ResponseTemplate::new(500)
                .set_delay(Duration::from_millis(300))
                .set_body_string("statement timeout"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks"))
        .and(body_partial_json(json!({"p_query": "fast"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"doc_id": 2, "seq": 0, "chunk": "fresh", "distance": 0.1}])),
        )
        .mount(&server)
        .await;

    let session = session(&server);
    let settings = RetrievalSettings::default();
    let (slow, fast) = tokio::join!(
        session.preview("slow", &settings),
        session.preview("fast", &settings)
    );

    assert_eq!(slow.unwrap(), None);
    assert_eq!(fast.unwrap().unwrap().rows[0].snippet, "fresh");
}

#[test_log::test(tokio::test)]
async fn latest_failure_is_still_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("statement timeout"))
        .mount(&server)
        .await;

    let err = session(&server)
        .preview("anything", &RetrievalSettings::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[test_log::test(tokio::test)]
async fn blank_query_does_not_supersede_preview_in_flight() {
    let server = MockServer::start().await;
    mount_documents(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!([{"doc_id": 1, "seq": 0, "chunk": "kept", "distance": 0.1}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = session(&server);
    let settings = RetrievalSettings::default();
    let (real, blank) = tokio::join!(session.preview("travel policy", &settings), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.preview("  ", &settings).await
    });

    assert!(blank.is_err());
    let real = real.unwrap().expect("blank query must not supersede");
    assert_eq!(real.rows[0].snippet, "kept");
    assert_eq!(real.generation.get(), 1);
}

#[test_log::test(tokio::test)]
async fn blank_query_is_rejected_before_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = session(&server)
        .preview("   ", &RetrievalSettings::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Query is empty");
}
