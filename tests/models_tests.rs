//! Chat model serialization tests

use aigateway::models::chat::{
    ChatMessage, CompletionRequest, CompletionResponse, ResponseFormat, Role,
};

#[test]
fn request_serialization_skips_unset_options() {
    let request = CompletionRequest::new("sonar-pro", vec![ChatMessage::user("hi")]);

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["model"], "sonar-pro");
    assert_eq!(value["messages"][0]["role"], "user");
    assert_eq!(value["messages"][0]["content"], "hi");
    assert!(value.get("max_tokens").is_none());
    assert!(value.get("temperature").is_none());
    assert!(value.get("response_format").is_none());
}

#[test]
fn request_serialization_includes_set_options() {
    let mut request = CompletionRequest::new(
        "sonar-pro",
        vec![
            ChatMessage::system("You are a terse analyst."),
            ChatMessage::user("Summarize."),
        ],
    );
    request.max_tokens = Some(512);
    request.temperature = Some(0.2);
    request.response_format = Some(ResponseFormat {
        format_type: "json_object".to_string(),
    });

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["max_tokens"], 512);
    assert_eq!(value["messages"][0]["role"], "system");
    assert_eq!(value["response_format"]["type"], "json_object");
}

#[test]
fn role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
    assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    assert_eq!(
        serde_json::to_string(&Role::Assistant).unwrap(),
        "\"assistant\""
    );
}

#[test]
fn response_deserialization_and_text_accessor() {
    let body = r#"{
        "id": "cmpl-123",
        "model": "sonar-pro",
        "choices": [
            {
                "index": 0,
                "message": {"role": "assistant", "content": "The answer."},
                "finish_reason": "stop"
            }
        ],
        "usage": {"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}
    }"#;

    let response: CompletionResponse = serde_json::from_str(body).unwrap();
    assert_eq!(response.text(), Some("The answer."));
    assert_eq!(response.choices[0].message.role, Role::Assistant);
    assert_eq!(response.usage.as_ref().unwrap().total_tokens, 14);
}

#[test]
fn response_tolerates_missing_optional_fields() {
    let body = r#"{
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "ok"}}
        ]
    }"#;

    let response: CompletionResponse = serde_json::from_str(body).unwrap();
    assert_eq!(response.id, None);
    assert_eq!(response.model, None);
    assert!(response.usage.is_none());
    assert_eq!(response.text(), Some("ok"));
}

#[test]
fn empty_choices_yield_no_text() {
    let body = r#"{"choices": []}"#;
    let response: CompletionResponse = serde_json::from_str(body).unwrap();
    assert_eq!(response.text(), None);
}

#[test]
fn upstream_error_body_parses() {
    use aigateway::models::chat::UpstreamErrorResponse;

    let body = r#"{"error": {"message": "Invalid API key", "type": "invalid_request_error", "code": 401}}"#;
    let parsed: UpstreamErrorResponse = serde_json::from_str(body).unwrap();
    assert_eq!(parsed.error.message, "Invalid API key");
    assert_eq!(parsed.error.error_type.as_deref(), Some("invalid_request_error"));
}
