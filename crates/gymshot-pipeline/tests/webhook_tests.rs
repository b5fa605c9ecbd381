#[cfg(test)]
mod tests {
    use gymshot_core::{GymshotError, WebhookPayload};
    use gymshot_pipeline::{HttpWebhook, WebhookSink};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sink(server: &MockServer) -> HttpWebhook {
        HttpWebhook::new(format!("{}/webhook/test", server.uri()), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_posts_record_as_json() {
        let server = MockServer::start().await;
        let record = json!({
            "name": "Przysiad",
            "mainMuscleGroups": [{"name": "Czwórogłowy uda", "imageUrl": null}]
        });
        Mock::given(method("POST"))
            .and(path("/webhook/test"))
            .and(header("content-type", "application/json"))
            .and(body_json(&record))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        sink(&server)
            .deliver(&WebhookPayload::Record(record))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_raw_fallback_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "raw_content": "Nie wiem" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        sink(&server)
            .deliver(&WebhookPayload::raw("Nie wiem"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such workflow"))
            .mount(&server)
            .await;

        let err = sink(&server)
            .deliver(&WebhookPayload::raw("x"))
            .await
            .unwrap_err();
        match err {
            GymshotError::Webhook(msg) => {
                assert!(msg.contains("404"));
                assert!(msg.contains("no such workflow"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let sink = HttpWebhook::new(server.uri(), Duration::from_millis(100));
        let err = sink.deliver(&WebhookPayload::raw("x")).await.unwrap_err();
        assert!(matches!(err, GymshotError::Webhook(ref msg) if msg.contains("timed out")));
    }

    #[tokio::test]
    async fn test_connection_refused_is_error() {
        let sink = HttpWebhook::new("http://127.0.0.1:1/webhook", Duration::from_secs(2));
        assert_eq!(sink.target(), "http://127.0.0.1:1/webhook");
        let err = sink.deliver(&WebhookPayload::raw("x")).await.unwrap_err();
        assert!(matches!(err, GymshotError::Webhook(_)));
    }
}
