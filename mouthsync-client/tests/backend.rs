use mouthsync_client::{ClientConfig, ClientError, GenerateRequest, VisemeClient};
use mouthsync_core::{AudioClip, Language};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> VisemeClient {
    VisemeClient::new(ClientConfig::with_base_url(server.uri())).unwrap()
}

fn request(language: Option<Language>) -> GenerateRequest {
    let clip = AudioClip::new("hello.wav", "audio/wav", b"RIFF....WAVE".to_vec());
    GenerateRequest::new(clip, "xin chào", language).unwrap()
}

fn timeline_body() -> serde_json::Value {
    serde_json::json!({
        "request_id": "abc",
        "processing_time": 0.42,
        "status": "success",
        "viseme_timeline": [
            {"start": 0.0, "end": 0.5, "duration": 0.5, "phoneme": "s", "viseme": 7},
            {"start": 0.5, "end": 1.2, "duration": 0.7, "phoneme": "a", "viseme": 12}
        ],
        "transcript": "xin chào",
        "metadata": {"total_duration": 1.2}
    })
}

#[tokio::test]
async fn generate_posts_multipart_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-viseme"))
        .and(body_string_contains("name=\"audio_file\"; filename=\"hello.wav\""))
        .and(body_string_contains("name=\"transcript\""))
        .and(body_string_contains("name=\"language\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(timeline_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .generate(&request(Some(Language::Vi)))
        .await
        .unwrap();

    assert_eq!(response.viseme_timeline.len(), 2);
    assert_eq!(response.processing_time, Some(0.42));
    assert_eq!(response.into_timeline().unwrap().len(), 2);
}

#[tokio::test]
async fn generate_without_language_omits_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-viseme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(timeline_body()))
        .mount(&server)
        .await;

    client_for(&server).generate(&request(None)).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&received[0].body);
    assert!(body.contains("name=\"transcript\""));
    assert!(!body.contains("name=\"language\""));
}

#[tokio::test]
async fn non_success_status_carries_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-viseme"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "Error generating viseme",
            "details": "alignment failed"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(&request(None))
        .await
        .unwrap_err();

    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Error generating viseme (alignment failed)");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway from proxy"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(&request(None))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Status { status: 502, ref message } if message == "Bad Gateway from proxy"
    ));
}

#[tokio::test]
async fn garbage_success_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(&request(None))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Port 9 (discard) is not served by anything in the test environment
    let client = VisemeClient::new(ClientConfig::with_base_url("http://127.0.0.1:9")).unwrap();
    let err = client.generate(&request(None)).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn example_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/example/text"))
        .and(query_param("language", "en"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "Hello there"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/example/audio"))
        .and(query_param("language", "en"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![1u8, 2, 3, 4])
                .insert_header("content-type", "audio/mpeg"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.example_text(Language::En).await.unwrap(), "Hello there");

    let clip = client.example_audio(Language::En).await.unwrap();
    assert_eq!(clip.file_name, "example_en.mp3");
    assert_eq!(clip.mime, "audio/mpeg");
    assert_eq!(&clip.data[..], &[1u8, 2, 3, 4]);
}

#[tokio::test]
async fn example_audio_rejects_non_audio() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/example/audio"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .insert_header("content-type", "application/json"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .example_audio(Language::Vi)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MalformedResponse(_)));
}

#[tokio::test]
async fn health_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "healthy",
            "timestamp": "2024-05-01T10:00:00",
            "components": {"api": "ok", "mfa": "ok"}
        })))
        .mount(&server)
        .await;

    let report = client_for(&server).health().await.unwrap();
    assert!(report.is_healthy());
    assert_eq!(report.components.len(), 2);
}
