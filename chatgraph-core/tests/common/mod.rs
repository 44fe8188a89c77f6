#![allow(dead_code)]

use async_openai::types::{CreateChatCompletionRequest, CreateChatCompletionResponse};
use chatgraph_core::prelude::*;
use mockall::mock;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

mock! {
    pub Client {}
    #[async_trait::async_trait]
    impl ChatClient for Client {
        async fn complete(
            &self,
            request: CreateChatCompletionRequest,
            options: Option<ChatCompletionCallOptions>,
        ) -> Result<CreateChatCompletionResponse, CompletionError>;
    }
}

mock! {
    pub Tracer {}
    #[async_trait::async_trait]
    impl TracingProvider for Tracer {
        async fn start_trace(
            &self,
            trace_id: &str,
            name: &str,
            trace_type: &str,
            inputs: &Value,
            parent_trace_id: Option<String>,
            start_time: Option<SystemTime>,
        ) -> Result<(), TracingError>;

        async fn end_trace(
            &self,
            trace_id: &str,
            outputs: &Value,
            end_time: Option<SystemTime>,
        ) -> Result<(), TracingError>;
    }
}

fn response(message: Value, finish_reason: &str) -> CreateChatCompletionResponse {
    serde_json::from_value(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 0,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": finish_reason,
            "logprobs": null
        }]
    }))
    .unwrap()
}

pub fn text_response(content: &str) -> CreateChatCompletionResponse {
    response(json!({ "role": "assistant", "content": content }), "stop")
}

/// `(id, name, arguments)` per call
pub fn tool_call_response(calls: &[(&str, &str, Value)]) -> CreateChatCompletionResponse {
    let tool_calls: Vec<Value> = calls
        .iter()
        .map(|(id, name, args)| {
            json!({
                "id": id,
                "type": "function",
                "function": { "name": name, "arguments": args.to_string() }
            })
        })
        .collect();
    response(
        json!({ "role": "assistant", "content": null, "tool_calls": tool_calls }),
        "tool_calls",
    )
}

/// A client that answers with `responses` in order and records every request.
pub fn scripted_client(
    responses: Vec<CreateChatCompletionResponse>,
) -> (MockClient, Arc<Mutex<Vec<CreateChatCompletionRequest>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();
    let mut queue: VecDeque<_> = responses.into();
    let mut client = MockClient::new();
    client
        .expect_complete()
        .times(queue.len())
        .returning(move |request, _| {
            seen.lock().unwrap().push(request);
            Ok(queue.pop_front().unwrap())
        });
    (client, requests)
}

pub fn scripted_model(
    responses: Vec<CreateChatCompletionResponse>,
) -> (ChatModel, Arc<Mutex<Vec<CreateChatCompletionRequest>>>) {
    let (client, requests) = scripted_client(responses);
    (ChatModel::new(Arc::new(client), "test-model"), requests)
}
