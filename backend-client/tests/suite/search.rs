use pretty_assertions::assert_eq;
use ragpilot_backend_client::{BackendClient, BackendError};
use ragpilot_retrieval::{
    ChatRequest, DocId, RetrievalMode, RetrievalRequest, StageParams, WeightPair,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&format!("{}/api", server.uri())).unwrap()
}

fn request(mode: RetrievalMode, stage: StageParams) -> RetrievalRequest {
    RetrievalRequest::new(mode, "expense limits", 3, WeightPair::new(0.45, 0.55), stage).unwrap()
}

#[test_log::test(tokio::test)]
async fn semantic_dispatch_posts_plain_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks"))
        .and(body_json(json!({"p_query": "expense limits", "k": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"doc_id": 1, "seq": 2, "chunk": "Meals are capped at $60.", "distance": 0.21}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = client(&server)
        .dispatch(&request(RetrievalMode::Semantic, StageParams::default()))
        .await
        .unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].doc_id, Some(DocId::from(1)));
    assert_eq!(candidates[0].seq, Some(2));
    assert_eq!(candidates[0].distance, Some(0.21));
}

#[test_log::test(tokio::test)]
async fn hybrid_dispatch_sends_weights() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks_hybrid"))
        .and(body_json(json!({
            "p_query": "expense limits",
            "k": 3,
            "p_w_lex": 0.45,
            "p_w_sem": 0.55
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = client(&server)
        .dispatch(&request(RetrievalMode::Hybrid, StageParams::default()))
        .await
        .unwrap();
    assert!(candidates.is_empty());
}

#[test_log::test(tokio::test)]
async fn hybrid_rerank_dispatch_flattens_wrapped_rows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks_rerank"))
        .and(body_json(json!({
            "p_query": "expense limits",
            "k": 3,
            "p_stage_k": 30,
            "p_stage_mode": "hybrid",
            "p_w_lex": 0.45,
            "p_w_sem": 0.55,
            "p_rerank_model": "BAAI/bge-reranker-base"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"search_chunks_rerank": [
                {"doc_id": 4, "seq": 0, "chunk": "Hotels up to $200.", "rerank_score": 0.91},
                {"doc_id": 5, "seq": 1, "chunk": "Per diem tables.", "rerank_score": 0.42, "distance": 0.3}
            ]}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let stage = StageParams::new(Some(30), Some(" BAAI/bge-reranker-base "));
    let candidates = client(&server)
        .dispatch(&request(RetrievalMode::HybridRerank, stage))
        .await
        .unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].rerank_score, Some(0.91));
    assert_eq!(candidates[0].distance, None);
    assert_eq!(candidates[1].distance, Some(0.3));
}

#[test_log::test(tokio::test)]
async fn non_success_status_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks_rerank"))
        .respond_with(ResponseTemplate::new(502).set_body_string("reranker unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .dispatch(&request(RetrievalMode::SemanticRerank, StageParams::default()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    match err {
        BackendError::Transport { status, body, .. } => {
            assert_eq!(status, 502);
            assert_eq!(body, "reranker unavailable");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn unparseable_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/search_chunks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .dispatch(&request(RetrievalMode::Semantic, StageParams::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Decode { .. }), "{err:?}");
}

#[test_log::test(tokio::test)]
async fn chat_unwraps_array_answers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/chat_rag_opts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"chat_rag": "Meals: $60 per day."}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let chat = ChatRequest::new(
        "meal limit?",
        5,
        RetrievalMode::Semantic,
        WeightPair::default(),
        None,
        StageParams::default(),
    )
    .unwrap();
    let answer = client(&server).chat(&chat).await.unwrap();
    assert_eq!(answer, "Meals: $60 per day.");
}

#[test_log::test(tokio::test)]
async fn chat_accepts_plain_text_answers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rpc/chat_rag_opts"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string("Forty days."),
        )
        .mount(&server)
        .await;

    let chat = ChatRequest::new(
        "how much leave?",
        5,
        RetrievalMode::HybridRerank,
        WeightPair::default(),
        Some(2),
        StageParams::default(),
    )
    .unwrap();
    assert_eq!(client(&server).chat(&chat).await.unwrap(), "Forty days.");
}
