#[cfg(test)]
mod tests {
    use gymshot_core::GymshotError;
    use gymshot_vision::{EncodedImage, OpenAiCompatProvider, VisionProvider, VisionRequest};
    use serde_json::json;
    use std::path::PathBuf;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_request() -> VisionRequest {
        VisionRequest {
            model: "openai/gpt-4.1-mini".into(),
            prompt: "Przeanalizuj zdjęcia".into(),
            images: vec![EncodedImage {
                source: PathBuf::from("screens/01.png"),
                data: "aGVsbG8=".into(),
            }],
        }
    }

    fn provider(server: &MockServer) -> OpenAiCompatProvider {
        OpenAiCompatProvider::new("sk-test".into())
            .with_base_url(format!("{}/api/v1/", server.uri()), "test")
            .with_attribution(
                Some("http://localhost:3000".into()),
                Some("Exercise Analysis Script".into()),
            )
    }

    // ── Happy path ─────────────────────────────────────────────

    #[tokio::test]
    async fn test_complete_sends_expected_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("x-title", "Exercise Analysis Script"))
            .and(header("http-referer", "http://localhost:3000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "```json\n{}\n```" } }],
                "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = provider(&server).complete(&make_request()).await.unwrap();
        assert_eq!(resp.content, "```json\n{}\n```");
        assert_eq!(resp.usage.input_tokens, 10);

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = received[0].body_json().unwrap();
        assert_eq!(body["model"], "openai/gpt-4.1-mini");
        assert_eq!(body["messages"][0]["content"][0]["text"], "Przeanalizuj zdjęcia");
        assert_eq!(
            body["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,aGVsbG8="
        );
    }

    // ── Failures ───────────────────────────────────────────────

    #[tokio::test]
    async fn test_non_2xx_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = provider(&server).complete(&make_request()).await.unwrap_err();
        match err {
            GymshotError::VisionProvider(msg) => {
                assert!(msg.starts_with("HTTP 429"));
                assert!(msg.contains("rate limited"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unexpected_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "error": { "code": 402 } })),
            )
            .mount(&server)
            .await;

        let err = provider(&server).complete(&make_request()).await.unwrap_err();
        match err {
            GymshotError::UnexpectedResponse { body } => assert!(body.contains("402")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let err = provider(&server)
            .with_timeout(Duration::from_millis(50))
            .complete(&make_request())
            .await
            .unwrap_err();
        assert!(matches!(err, GymshotError::VisionProvider(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_provider_error() {
        let provider = OpenAiCompatProvider::new("sk-test".into())
            .with_base_url("http://127.0.0.1:1", "closed");
        let err = provider.complete(&make_request()).await.unwrap_err();
        assert!(matches!(err, GymshotError::VisionProvider(_)));
    }
}
