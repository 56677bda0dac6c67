use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use symptom_triage::assistant::{ERROR_PREFIX, MAX_ERROR_BODY_CHARS};
use symptom_triage::{Assistant, AssistantError, ChatSession, GeminiAssistant, Transcript};

/// Reads one HTTP request (headers plus Content-Length body) and returns it as text.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Serves a single canned HTTP response and hands back the request it received.
async fn serve_once(
    status_line: &'static str,
    body: impl Into<String>,
) -> (SocketAddr, tokio::task::JoinHandle<String>) {
    let body = body.into();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        request
    });
    (addr, handle)
}

fn assistant_for(addr: SocketAddr, timeout_secs: u64) -> GeminiAssistant {
    GeminiAssistant::new("test-key", "gemini-2.0-flash", &format!("http://{}", addr), timeout_secs).unwrap()
}

#[tokio::test]
async fn test_generate_success() {
    let (addr, server) = serve_once(
        "200 OK",
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Malaria spreads through mosquito bites."}]}}]}"#,
    )
    .await;

    let reply = assistant_for(addr, 5).generate("What causes malaria?").await.unwrap();
    assert_eq!(reply, "Malaria spreads through mosquito bites.");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1beta/models/gemini-2.0-flash:generateContent"));
    assert!(request.to_lowercase().contains("x-goog-api-key: test-key"));
    assert!(request.contains("What causes malaria?"));
}

#[tokio::test]
async fn test_generate_error_status() {
    let (addr, server) = serve_once("429 Too Many Requests", r#"{"error":"quota exceeded"}"#).await;

    let result = assistant_for(addr, 5).generate("hello").await;
    match result {
        Err(AssistantError::Status { status, body }) => {
            assert_eq!(status, 429);
            assert!(body.contains("quota exceeded"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_generate_error_status_body_capped() {
    let (addr, server) = serve_once("500 Internal Server Error", "x".repeat(10_000)).await;

    match assistant_for(addr, 5).generate("hello").await {
        Err(AssistantError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body.len(), MAX_ERROR_BODY_CHARS + 3);
            assert!(body.ends_with("..."));
        }
        other => panic!("expected status error, got {:?}", other),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_generate_error_status_unreadable_body() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request(&mut stream).await;
        // Promise more bytes than are sent, then close
        let response = "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 1000\r\nConnection: close\r\n\r\npartial";
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
    });

    match assistant_for(addr, 5).generate("hello").await {
        Err(AssistantError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert!(body.starts_with("<unreadable body:"), "{}", body);
        }
        other => panic!("expected status error, got {:?}", other),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_generate_connection_refused() {
    // Bind then drop to get a port nobody listens on
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let result = assistant_for(addr, 5).generate("hello").await;
    assert!(matches!(result, Err(AssistantError::Connection(_))));
}

#[tokio::test]
async fn test_generate_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        // Accept and never answer
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        drop(stream);
    });

    let result = assistant_for(addr, 1).generate("hello").await;
    assert!(matches!(result, Err(AssistantError::Timeout(1))));
    server.abort();
}

#[tokio::test]
async fn test_network_fault_lands_in_transcript() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let session = ChatSession::new(Some(assistant_for(addr, 5)));

    let transcript = Transcript::new();
    let transcript = session.submit(transcript, "What is dengue?").await;
    assert_eq!(transcript.len(), 2);
    let reply = transcript.last().unwrap();
    assert!(!reply.is_user);
    assert!(reply.text.starts_with(ERROR_PREFIX));

    // The session keeps accepting input
    let transcript = session.submit(transcript, "And typhoid?").await;
    assert_eq!(transcript.len(), 4);
    assert!(transcript.messages()[2].is_user);
}
