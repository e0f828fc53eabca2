//! Tests for generation module

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::error::ReelError;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    // ============ Content generator ============

    #[tokio::test]
    async fn test_review_request_shape() {
        let stub = StaticGenerator::with_items(&["A tense, beautifully shot thriller."]);
        let generator = ContentGenerator::new(Arc::new(stub.clone()));

        let items = generator
            .generate("The Matrix", 10, ContentKind::Review)
            .await
            .unwrap();
        assert_eq!(items, vec!["A tense, beautifully shot thriller."]);

        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.max_output_tokens, 1500);
        assert!((call.temperature - 0.8).abs() < f32::EPSILON);
        assert_eq!(call.messages.len(), 2);
        assert_eq!(call.messages[0].role, ChatRole::System);
        assert!(call.messages[0].content.contains("valid JSON arrays only"));
        assert_eq!(call.messages[1].role, ChatRole::User);

        let prompt = &call.messages[1].content;
        assert!(prompt.contains("exactly 10"));
        assert!(prompt.contains("\"The Matrix\""));
        assert!(prompt.contains("positive, negative, mixed"));
        assert!(prompt.contains("Return ONLY a valid JSON array of strings"));
        assert!(!prompt.contains("280"));
    }

    #[tokio::test]
    async fn test_tweet_request_shape() {
        let stub = StaticGenerator::with_items(&["Keanu is a national treasure and we do not deserve him"]);
        let generator = ContentGenerator::new(Arc::new(stub.clone()));

        generator
            .generate("  Keanu Reeves ", 20, ContentKind::Tweet)
            .await
            .unwrap();

        let calls = stub.calls();
        let call = &calls[0];
        assert_eq!(call.max_output_tokens, 2000);
        assert!(call.messages[0].content.contains("social media"));

        let prompt = &call.messages[1].content;
        assert!(prompt.contains("exactly 20"));
        assert!(prompt.contains("\"Keanu Reeves\""));
        assert!(prompt.contains("under 280 characters"));
        assert!(prompt.contains("[\"tweet1\", \"tweet2\", \"tweet3\"]"));
    }

    #[tokio::test]
    async fn test_strict_reply_not_truncated() {
        let stub = StaticGenerator::with_items(&["one", "two", "three", "four"]);
        let generator = ContentGenerator::new(Arc::new(stub));

        let items = generator.generate("Heat", 2, ContentKind::Review).await.unwrap();
        assert_eq!(items.len(), 4);
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back() {
        let stub = StaticGenerator::with_reply(
            "Sure! Here are your reviews:\n1. \"A sprawling, gorgeous epic.\"\n2. \"Too long by an hour.\"\nok",
        );
        let generator = ContentGenerator::new(Arc::new(stub));

        let items = generator.generate("Dune", 5, ContentKind::Review).await.unwrap();
        assert_eq!(
            items,
            vec![
                "Sure! Here are your reviews:",
                "1. \"A sprawling, gorgeous epic.",
                "2. \"Too long by an hour.",
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_request_skips_service() {
        let stub = StaticGenerator::with_items(&["unused"]);
        let generator = ContentGenerator::new(Arc::new(stub.clone()));

        let zero = generator.generate("Alien", 0, ContentKind::Review).await;
        assert!(matches!(zero, Err(ReelError::InvalidRequest(_))));

        let blank = generator.generate("   ", 3, ContentKind::Tweet).await;
        assert!(matches!(blank, Err(ReelError::InvalidRequest(_))));

        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let mut mock = MockTextGenerator::new();
        mock.expect_complete()
            .times(1)
            .returning(|_, _, _| Err(ReelError::Auth("invalid api key".into())));

        let generator = ContentGenerator::new(Arc::new(mock));
        let err = generator
            .generate("Casablanca", 10, ContentKind::Review)
            .await
            .unwrap_err();

        assert!(matches!(err, ReelError::Auth(ref msg) if msg == "invalid api key"));
    }

    #[tokio::test]
    async fn test_reply_without_segments() {
        let mut mock = MockTextGenerator::new();
        mock.expect_complete()
            .returning(|_, _, _| Ok(Completion::default()));

        let generator = ContentGenerator::new(Arc::new(mock));
        let err = generator.generate("Jaws", 3, ContentKind::Review).await.unwrap_err();
        assert!(matches!(err, ReelError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_first_segment_is_used() {
        let mut mock = MockTextGenerator::new();
        mock.expect_complete().returning(|_, _, _| {
            Ok(Completion {
                segments: vec![
                    r#"["first segment item"]"#.to_string(),
                    r#"["second segment item"]"#.to_string(),
                ],
            })
        });

        let generator = ContentGenerator::new(Arc::new(mock));
        let items = generator.generate("Up", 1, ContentKind::Review).await.unwrap();
        assert_eq!(items, vec!["first segment item"]);
    }

    #[test]
    fn test_kind_parameters() {
        assert_eq!(ContentKind::Review.max_output_tokens(), 1500);
        assert_eq!(ContentKind::Tweet.max_output_tokens(), 2000);
        assert_eq!(ContentKind::Review.default_count(), 10);
        assert_eq!(ContentKind::Tweet.default_count(), 20);
        assert_eq!(ContentKind::Review.char_limit(), None);
        assert_eq!(ContentKind::Tweet.char_limit(), Some(280));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Review".parse::<ContentKind>().unwrap(), ContentKind::Review);
        assert_eq!("tweets".parse::<ContentKind>().unwrap(), ContentKind::Tweet);
        assert!("poem".parse::<ContentKind>().is_err());
        assert_eq!(
            serde_json::to_string(&ContentKind::Tweet).unwrap(),
            "\"tweet\""
        );
    }

    #[test]
    fn test_generation_request_accessors() {
        let request = GenerationRequest::new(" Heat ", 3, ContentKind::Review).unwrap();
        assert_eq!(request.subject_name(), "Heat");
        assert_eq!(request.desired_count(), 3);
        assert_eq!(request.kind(), ContentKind::Review);
        assert_eq!(request.messages().len(), 2);
    }

    // ============ HTTP client against a local server ============

    /// Accept one connection, capture the request, send `response`
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            while !request_complete(&buf) {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&buf).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn request_complete(buf: &[u8]) -> bool {
        let text = String::from_utf8_lossy(buf);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        buf.len() >= header_end + 4 + content_length
    }

    fn http_response(status: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
            status,
            body.len(),
            extra_headers,
            body
        )
    }

    fn local_client(provider: LlmProvider) -> LlmClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        LlmClient::with_http(provider, http)
    }

    fn chat_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_compatible_client_round_trip() {
        let body = chat_body("```json\n[\"Loved every minute of it, a classic\"]\n```");
        let (base_url, server) = serve_once(http_response("200 OK", "", &body)).await;

        let client = local_client(LlmProvider::Compatible {
            api_key: Some("local-key".to_string()),
            model: "llama3".to_string(),
            base_url,
        });
        let generator = ContentGenerator::new(Arc::new(client));

        let items = generator.generate("Amelie", 1, ContentKind::Tweet).await.unwrap();
        assert_eq!(items, vec!["Loved every minute of it, a classic"]);

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /v1/chat/completions"));
        assert!(request.contains("authorization: bearer local-key"));
        assert!(request.contains("\"model\":\"llama3\""));
        assert!(request.contains("\"max_tokens\":2000"));
        assert!(request.contains("\"temperature\":0.8"));
        assert!(request.contains("\"role\":\"system\""));
    }

    #[tokio::test]
    async fn test_azure_client_routing() {
        let (endpoint, server) = serve_once(http_response("200 OK", "", &chat_body("[]"))).await;

        let client = local_client(LlmProvider::AzureOpenAI {
            endpoint: format!("{}/", endpoint),
            api_key: "azure-key".to_string(),
            deployment: "gpt-4.1-nano".to_string(),
            api_version: "2024-10-21".to_string(),
        });

        let completion = client
            .complete(&[ChatMessage::user("hello")], 1500, 0.8)
            .await
            .unwrap();
        assert_eq!(completion.first_text(), Some("[]"));

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with(
            "post /openai/deployments/gpt-4.1-nano/chat/completions?api-version=2024-10-21"
        ));
        assert!(request.contains("api-key: azure-key"));
        assert!(!request.contains("\"model\""));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth() {
        let (base_url, _server) =
            serve_once(http_response("401 Unauthorized", "", r#"{"error":"bad key"}"#)).await;
        let client = local_client(LlmProvider::Compatible {
            api_key: None,
            model: "m".to_string(),
            base_url,
        });

        let err = client.complete(&[ChatMessage::user("x")], 10, 0.8).await.unwrap_err();
        assert!(matches!(err, ReelError::Auth(_)));
        assert!(err.is_generation_failure());
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let (base_url, _server) = serve_once(http_response(
            "429 Too Many Requests",
            "Retry-After: 7\r\n",
            "{}",
        ))
        .await;
        let client = local_client(LlmProvider::Compatible {
            api_key: None,
            model: "m".to_string(),
            base_url,
        });

        let err = client.complete(&[ChatMessage::user("x")], 10, 0.8).await.unwrap_err();
        assert!(matches!(err, ReelError::RateLimited { retry_after_secs: 7 }));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_api() {
        let (base_url, _server) =
            serve_once(http_response("500 Internal Server Error", "", "{}")).await;
        let client = local_client(LlmProvider::Compatible {
            api_key: None,
            model: "m".to_string(),
            base_url,
        });

        let err = client.complete(&[ChatMessage::user("x")], 10, 0.8).await.unwrap_err();
        assert!(matches!(err, ReelError::Api(ref msg) if msg.contains("500")));
    }

    fn anthropic_client(base_url: String) -> LlmClient {
        local_client(LlmProvider::Anthropic {
            api_key: "anthropic-key".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            base_url,
        })
    }

    #[tokio::test]
    async fn test_anthropic_client_round_trip() {
        let body = serde_json::json!({
            "content": [
                { "type": "text", "text": "[\"A quiet, devastating character study\"]" },
                { "type": "tool_use" }
            ]
        })
        .to_string();
        let (base_url, server) = serve_once(http_response("200 OK", "", &body)).await;
        let generator = ContentGenerator::new(Arc::new(anthropic_client(base_url)));

        let items = generator.generate("Aftersun", 1, ContentKind::Review).await.unwrap();
        assert_eq!(items, vec!["A quiet, devastating character study"]);

        let raw = server.await.unwrap();
        assert!(raw.to_lowercase().starts_with("post /v1/messages"));
        assert!(raw.to_lowercase().contains("x-api-key: anthropic-key"));

        let (_, json_body) = raw.split_once("\r\n\r\n").unwrap();
        let sent: serde_json::Value = serde_json::from_str(json_body).unwrap();
        assert!(sent["system"]
            .as_str()
            .unwrap()
            .starts_with("You are a helpful assistant that generates movie reviews"));
        let messages = sent["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert!(messages[0]["content"].as_str().unwrap().contains("\"Aftersun\""));
        assert_eq!(sent["max_tokens"], 1500);
    }

    #[tokio::test]
    async fn test_anthropic_empty_content() {
        let (base_url, _server) =
            serve_once(http_response("200 OK", "", r#"{"content":[]}"#)).await;

        let err = anthropic_client(base_url)
            .complete(&[ChatMessage::user("x")], 10, 0.8)
            .await
            .unwrap_err();
        assert!(matches!(err, ReelError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_request_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        // accept and never answer
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            drop(socket);
        });

        let config = crate::config::GeneratorConfig {
            provider: "compatible".to_string(),
            api_key: String::new(),
            endpoint: Some(base_url.clone()),
            model: Some("m".to_string()),
            api_version: None,
            timeout_secs: 1,
        };
        let http = super::super::client::http_builder(&config).no_proxy().build().unwrap();
        let client = LlmClient::with_http(
            LlmProvider::Compatible {
                api_key: None,
                model: "m".to_string(),
                base_url,
            },
            http,
        );

        let started = std::time::Instant::now();
        let err = client.complete(&[ChatMessage::user("x")], 10, 0.8).await.unwrap_err();
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        assert!(matches!(err, ReelError::Network(ref e) if e.is_timeout()));
        assert!(err.is_generation_failure());
    }
}
