//! Helpers shared by the binary-level integration tests

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;

use assert_cmd::Command;

/// Serve `answers` as chat completion responses, one per request, in order.
/// Returns the base URL to put in `--model-config`.
pub fn fake_model(answers: &[&str]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let bodies: Vec<String> = answers
        .iter()
        .map(|answer| {
            serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": answer },
                    "finish_reason": "stop"
                }]
            })
            .to_string()
        })
        .collect();

    thread::spawn(move || {
        for body in bodies {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream);

            // Consume the request so the client never sees a reset
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).ok();

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).ok();
        }
    });

    format!("http://{addr}/v1")
}

/// The binary as a plain process, isolated from the user's home directory and environment
pub fn agent_builder_process(dir: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_agent-builder"));
    cmd.current_dir(dir)
        .env("BUILDER_DATA_DIR", dir.join("data"))
        .env_remove("BUILDER_KNOWLEDGE_BASE_ID")
        .env_remove("BUILDER_KNOWLEDGE_DIR")
        .env_remove("BUILDER_EXTRA_TOOLS")
        .env_remove("BUILDER_SYSTEM_PROMPT")
        .env_remove("LANGFUSE_HOST")
        .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT")
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// The binary, isolated from the user's home directory and environment
pub fn agent_builder(dir: &Path) -> Command {
    Command::from_std(agent_builder_process(dir))
}

/// Arguments selecting a local OpenAI-compatible model at `base_url`
pub fn local_model_args(base_url: &str) -> Vec<String> {
    vec![
        "--model-provider".to_string(),
        "ollama".to_string(),
        "--model-config".to_string(),
        serde_json::json!({ "base_url": base_url }).to_string(),
    ]
}
