use cn_core::types::{ChatRequest, TaskKind};
use cn_core::ChatClient;
use config::AzureOpenAiConfig;
use errors::LlmError;
use llm::AzureOpenAiClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn azure_config(endpoint: &str) -> AzureOpenAiConfig {
    AzureOpenAiConfig {
        api_key: Some("test-key".to_string()),
        endpoint: Some(endpoint.to_string()),
        api_version: "2023-05-15".to_string(),
        summary_deployment: Some("gpt-summary".to_string()),
        extraction_deployment: Some("gpt-extract".to_string())
    }
}

fn extract_request() -> ChatRequest {
    ChatRequest {
        task: TaskKind::Extract,
        deployment: "gpt-extract".to_string(),
        system: "Extract the key medical info.".to_string(),
        user: "Extract structured data from: BP 140/90.".to_string(),
        temperature: 0.1,
        max_tokens: 1000
    }
}

#[tokio::test]
async fn test_complete_returns_content_and_usage() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-extract/chat/completions"))
        .and(query_param("api-version", "2023-05-15"))
        .and(header("api-key", "test-key"))
        .and(body_partial_json(json!({
            "temperature": 0.1,
            "max_tokens": 1000,
            "top_p": 0.95
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"medications\": []}"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AzureOpenAiClient::new(azure_config(&server.uri())).unwrap();
    let reply = client.complete(&extract_request()).await.unwrap();

    assert_eq!(reply.content, "{\"medications\": []}");
    assert_eq!(reply.usage.unwrap().total_tokens, 128);
}

#[tokio::test]
async fn test_complete_sends_system_and_user_messages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "content": "Extract the key medical info."},
                {"role": "user", "content": "Extract structured data from: BP 140/90."}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AzureOpenAiClient::new(azure_config(&server.uri())).unwrap();
    let reply = client.complete(&extract_request()).await.unwrap();
    assert_eq!(reply.content, "ok");
    assert!(reply.usage.is_none());
}

#[tokio::test]
async fn test_rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&server)
        .await;

    let client = AzureOpenAiClient::new(azure_config(&server.uri())).unwrap();
    let err = client.complete(&extract_request()).await.unwrap_err();

    assert!(matches!(
        err,
        LlmError::RateLimited {
            retry_after_secs: 30
        }
    ));
}

#[tokio::test]
async fn test_server_error_maps_to_request_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = AzureOpenAiClient::new(azure_config(&server.uri())).unwrap();
    let err = client.complete(&extract_request()).await.unwrap_err();

    match err {
        LlmError::RequestFailed { reason } => {
            assert!(reason.contains("500"));
            assert!(reason.contains("upstream exploded"));
        }
        other => panic!("unexpected error: {other:?}")
    }
}

#[tokio::test]
async fn test_empty_choices_maps_to_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = AzureOpenAiClient::new(azure_config(&server.uri())).unwrap();
    let err = client.complete(&extract_request()).await.unwrap_err();

    assert!(matches!(err, LlmError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_missing_api_key_fails_not_configured() {
    let mut config = azure_config("https://unit.openai.azure.com");
    config.api_key = None;

    let client = AzureOpenAiClient::new(config).unwrap();
    let err = client.complete(&extract_request()).await.unwrap_err();

    match err {
        LlmError::NotConfigured { missing } => assert_eq!(missing, "AZURE_OPENAI_API_KEY"),
        other => panic!("unexpected error: {other:?}")
    }
}
