//! End-to-end tests: the real router on an ephemeral port, stub embeddings,
//! no language model.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use api::{AppSettings, AppState, ServerConfig};
use axum::{Router, response::Html, routing::get};
use contextor::PipelineConfig;
use rag_store::{EmbeddingBackend, EmbeddingConfig, SplitterConfig};
use reqwest::{
    Client, StatusCode,
    multipart::{Form, Part},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

const REFUND: &str = "Our refund policy allows returns within 30 days of purchase for any reason.";

async fn spawn_app() -> String {
    let llm = Arc::new(LlmServiceProfiles::new(None, None, Some(1)).unwrap());
    let settings = AppSettings {
        server: ServerConfig {
            address: "127.0.0.1:0".into(),
            max_upload_bytes: 1024 * 1024,
        },
        embedding: EmbeddingConfig {
            backend: Some(EmbeddingBackend::Stub),
            stub_dim: 256,
        },
        pipeline: PipelineConfig::default(),
        splitter: SplitterConfig::default(),
    };
    let state = Arc::new(AppState::new(settings, llm).unwrap());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        api::serve(listener, state, std::future::pending()).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_site(html: &'static str) -> String {
    let app = Router::new().route("/page", get(move || async move { Html(html) }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/page")
}

async fn post_json(client: &Client, url: String, body: Value) -> (StatusCode, Value) {
    let resp = client.post(url).json(&body).send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn health_reports_no_providers() {
    let base = spawn_app().await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["providers"], json!([]));
}

#[tokio::test]
async fn request_id_is_echoed_or_minted() {
    let base = spawn_app().await;
    let client = Client::new();

    let resp = client
        .get(format!("{base}/stats"))
        .header("x-request-id", "client-42")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "client-42");

    let resp = client.get(format!("{base}/stats")).send().await.unwrap();
    let minted = resp.headers()["x-request-id"].to_str().unwrap();
    assert!(minted.starts_with("req-"));
}

#[tokio::test]
async fn text_ingestion_then_fallback_answer() {
    let base = spawn_app().await;
    let client = Client::new();

    let (status, body) = post_json(
        &client,
        format!("{base}/add_text"),
        json!({ "text": REFUND, "title": "Policy" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["chunks_added"], 1);
    assert_eq!(body["data"]["total_chunks"], 1);

    let (status, body) = post_json(
        &client,
        format!("{base}/generate_answer"),
        json!({ "question": "What is the refund policy?" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["context_found"], true);
    assert_eq!(data["model_used"], "fallback-enhanced");
    assert_eq!(data["chunks_used"], 1);
    assert_eq!(data["answer"], REFUND);
    assert_eq!(data["sources"][0]["title"], "Policy");
    assert_eq!(data["sources"][0]["source"], "text");
}

#[tokio::test]
async fn fallback_answer_lists_only_relevant_sources() {
    let base = spawn_app().await;
    let client = Client::new();

    post_json(&client, format!("{base}/add_text"), json!({ "text": REFUND })).await;
    post_json(&client, format!("{base}/add_text"), json!({ "text": "short note" })).await;

    let (status, body) = post_json(
        &client,
        format!("{base}/generate_answer"),
        json!({ "question": "What is the refund policy?" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["model_used"], "fallback-enhanced");
    assert_eq!(data["chunks_used"], 1);

    let sources = data["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 1);
    assert!(sources[0]["preview"].as_str().unwrap().starts_with("Our refund policy"));
}

#[tokio::test]
async fn query_returns_score_and_distance() {
    let base = spawn_app().await;
    let client = Client::new();

    post_json(&client, format!("{base}/add_text"), json!({ "text": "short note" })).await;
    post_json(&client, format!("{base}/add_text"), json!({ "text": REFUND })).await;

    let (status, body) = post_json(
        &client,
        format!("{base}/query"),
        json!({ "question": "refund policy", "k": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    for hit in results {
        let score = hit["score"].as_f64().unwrap();
        let distance = hit["distance"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score));
        assert!((score + distance - 1.0).abs() < 1e-6);
    }
    assert!(results.iter().any(|h| h["text"] == "short note"));
}

#[tokio::test]
async fn empty_store_answers_without_context() {
    let base = spawn_app().await;
    let client = Client::new();

    let (status, body) = post_json(
        &client,
        format!("{base}/generate_answer"),
        json!({ "question": "What is the refund policy?", "k": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["context_found"], false);
    assert_eq!(body["data"]["model_used"], "none");
    assert_eq!(body["data"]["chunks_used"], 0);
    assert_eq!(body["data"]["sources"], json!([]));

    let (_, body) = post_json(&client, format!("{base}/query"), json!({ "question": "refund" })).await;
    assert_eq!(body["data"]["results"], json!([]));
}

#[tokio::test]
async fn invalid_requests_use_the_error_envelope() {
    let base = spawn_app().await;
    let client = Client::new();

    let (status, body) =
        post_json(&client, format!("{base}/generate_answer"), json!({ "question": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    let (status, body) = post_json(
        &client,
        format!("{base}/query"),
        json!({ "question": "refund", "k": -2 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    let (status, body) = post_json(&client, format!("{base}/generate_answer"), json!({ "k": 3 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["details"][0]["path"], "question");

    let (status, body) = post_json(&client, format!("{base}/add_text"), json!({ "text": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_DOCUMENT");
}

#[tokio::test]
async fn upload_accepts_known_types_and_rejects_others() {
    let base = spawn_app().await;
    let client = Client::new();

    let form = Form::new()
        .part("files", Part::bytes(REFUND.as_bytes().to_vec()).file_name("policy.txt"))
        .part("files", Part::bytes(b"a,b\n1,2\n".to_vec()).file_name("table.csv"));
    let resp = client.post(format!("{base}/upload")).multipart(form).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["documents"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["total_chunks"], 2);

    let form = Form::new().part("files", Part::bytes(vec![0u8; 8]).file_name("tool.exe"));
    let resp = client.post(format!("{base}/upload")).multipart(form).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UNSUPPORTED_FILE_TYPE");

    let stats: Value = reqwest::get(format!("{base}/stats")).await.unwrap().json().await.unwrap();
    assert_eq!(stats["data"]["total_chunks"], 2);
    assert_eq!(stats["data"]["embedding_backend"], "stub");
    assert_eq!(stats["data"]["model"], Value::Null);
}

#[tokio::test]
async fn website_ingestion_and_clear() {
    let base = spawn_app().await;
    let site = spawn_site(
        "<html><head><title>Returns</title><script>track()</script></head>\
         <body><p>Our refund policy allows returns within 30 days of purchase.</p></body></html>",
    )
    .await;
    let client = Client::new();

    let (status, body) = post_json(&client, format!("{base}/add_website"), json!({ "url": site })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["chunks_added"], 1);

    let (_, body) = post_json(&client, format!("{base}/query"), json!({ "question": "refund" })).await;
    let hit = &body["data"]["results"][0];
    assert_eq!(hit["metadata"]["title"], "Returns");
    assert_eq!(hit["metadata"]["source"], "website");
    assert!(!hit["text"].as_str().unwrap().contains("track()"));

    let (status, _) = post_json(&client, format!("{base}/add_website"), json!({ "url": "ftp://x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for _ in 0..2 {
        let resp = client.post(format!("{base}/clear")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let stats: Value = reqwest::get(format!("{base}/stats")).await.unwrap().json().await.unwrap();
        assert_eq!(stats["data"]["total_chunks"], 0);
    }
}
