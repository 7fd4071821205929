//! End-to-end runs of the REPL against in-memory stdin/stdout.
//!
//! The first group uses a scripted model; the last tests drive the real
//! HTTP client against an in-process fake model server.

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use aic::api::ApiClient;
use aic::config::{ConfigLocation, ModelSettings, DEFAULT_INSTRUCTIONS_TEMPLATE};
use aic::error::ModelError;
use aic::instructions::InstructionSet;
use aic::model::{Availability, LanguageModel, LocalModel, ModelSession, UnavailableReason};
use aic::repl::{self, separator_rule, RunOutcome, FAREWELL_MESSAGE, READY_MESSAGE};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

struct TempConfigDir(PathBuf);

impl TempConfigDir {
    fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let root = std::env::temp_dir().join(format!(
            "aic-it-{tag}-{}-{nanos}",
            std::process::id()
        ));
        fs::create_dir_all(&root).unwrap();
        Self(root)
    }

    fn location(&self) -> ConfigLocation {
        ConfigLocation::new(self.0.join(".aiCodeAssistant"))
    }
}

impl Drop for TempConfigDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

#[derive(Default)]
struct Log {
    replies: VecDeque<Result<String, ModelError>>,
    prompts: Vec<String>,
    sessions: Vec<String>,
}

struct EchoModel {
    availability: Availability,
    log: Arc<Mutex<Log>>,
}

impl EchoModel {
    fn new(availability: Availability, replies: Vec<Result<String, ModelError>>) -> Self {
        Self {
            availability,
            log: Arc::new(Mutex::new(Log {
                replies: replies.into(),
                ..Log::default()
            })),
        }
    }
}

#[async_trait]
impl LanguageModel for EchoModel {
    async fn availability(&self) -> Availability {
        self.availability.clone()
    }

    fn create_session(&self, instructions: &InstructionSet) -> Box<dyn ModelSession + '_> {
        self.log
            .lock()
            .unwrap()
            .sessions
            .push(instructions.as_str().to_string());
        Box::new(EchoSession {
            log: Arc::clone(&self.log),
        })
    }
}

struct EchoSession {
    log: Arc<Mutex<Log>>,
}

#[async_trait]
impl ModelSession for EchoSession {
    async fn respond(
        &mut self,
        prompt: &str,
        on_text: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String, ModelError> {
        let reply = {
            let mut log = self.log.lock().unwrap();
            log.prompts.push(prompt.to_string());
            log.replies
                .pop_front()
                .unwrap_or_else(|| Ok(format!("echo: {prompt}")))
        };
        let text = reply?;
        on_text(&text);
        Ok(text)
    }
}

async fn drive<M: LanguageModel>(
    model: &M,
    location: Option<&ConfigLocation>,
    stdin: &str,
) -> (RunOutcome, String) {
    let mut out = Vec::new();
    let outcome = repl::run(model, location, stdin.as_bytes(), &mut out)
        .await
        .expect("in-memory io");
    (outcome, String::from_utf8(out).expect("utf-8 output"))
}

fn separator_block() -> String {
    format!("\n\n{}\n\n", separator_rule())
}

#[tokio::test]
async fn first_run_creates_instructions_and_answers() {
    let dir = TempConfigDir::new("first-run");
    let location = dir.location();
    let model = EchoModel::new(Availability::Available, vec![]);

    let (outcome, out) = drive(&model, Some(&location), "ping\nexit\n").await;

    assert_eq!(outcome, RunOutcome::Exited);
    assert_eq!(
        fs::read_to_string(location.instructions_path()).unwrap(),
        DEFAULT_INSTRUCTIONS_TEMPLATE
    );
    assert!(out.starts_with("AI Code Assistant initializing.\n"));
    assert!(out.contains("Instructions file not found. Creating a default one...\n"));
    assert!(out.contains(&format!(
        "{READY_MESSAGE}\necho: ping{}{FAREWELL_MESSAGE}\n",
        separator_block()
    )));

    let log = model.log.lock().unwrap();
    assert_eq!(log.sessions, vec![DEFAULT_INSTRUCTIONS_TEMPLATE.to_string()]);
    assert_eq!(log.prompts, vec!["ping"]);
}

#[tokio::test]
async fn second_run_reads_existing_file_without_rewriting() {
    let dir = TempConfigDir::new("second-run");
    let location = dir.location();
    fs::create_dir_all(location.dir()).unwrap();
    fs::write(location.instructions_path(), "Answer in haiku.").unwrap();
    let model = EchoModel::new(Availability::Available, vec![]);

    let (outcome, out) = drive(&model, Some(&location), "").await;

    assert_eq!(outcome, RunOutcome::EndOfInput);
    assert!(out.contains("Successfully loaded instructions from "));
    assert!(!out.contains("Creating a default one"));
    assert_eq!(
        fs::read_to_string(location.instructions_path()).unwrap(),
        "Answer in haiku."
    );
    assert_eq!(model.log.lock().unwrap().sessions, vec!["Answer in haiku."]);
}

#[tokio::test]
async fn errors_are_reported_per_turn() {
    let model = EchoModel::new(
        Availability::Available,
        vec![
            Err(ModelError::Stream("context window exceeded".to_string())),
            Ok("fine now".to_string()),
        ],
    );

    let (outcome, out) = drive(&model, None, "too long\nshort\nEXIT\n").await;

    assert_eq!(outcome, RunOutcome::Exited);
    let block = separator_block();
    assert!(out.contains(&format!(
        "\nAn error occurred: stream failed: context window exceeded{block}fine now{block}"
    )));
    assert_eq!(out.matches(&separator_rule()).count(), 2);
}

#[tokio::test]
async fn unavailable_model_never_reads_input() {
    let dir = TempConfigDir::new("unavailable");
    let location = dir.location();
    let model = EchoModel::new(
        Availability::Unavailable(UnavailableReason::NotAuthorized { status: 401 }),
        vec![],
    );

    let (outcome, out) = drive(&model, Some(&location), "hello\nexit\n").await;

    assert_eq!(outcome, RunOutcome::ModelUnavailable);
    assert!(out.contains("Error: The on-device language model is not available."));
    assert!(!out.contains(READY_MESSAGE));
    assert!(!location.instructions_path().exists());
    assert!(model.log.lock().unwrap().prompts.is_empty());
}

fn http_response(content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Serve the model catalog, then one chat response, on a local port.
async fn serve_model(chat_response: String) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let responses = vec![
        http_response("application/json", r#"{"data":[{"id":"llama3.2:latest"}]}"#),
        chat_response,
    ];
    tokio::spawn(async move {
        for response in responses {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut request_buf = [0u8; 8192];
            let _ = stream.read(&mut request_buf).await;
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });
    addr
}

fn local_model(addr: std::net::SocketAddr) -> LocalModel<ApiClient> {
    let settings = ModelSettings {
        base_url: format!("http://{addr}/v1"),
        model: "llama3.2".to_string(),
        timeout_secs: 3,
        ..ModelSettings::default()
    };
    LocalModel::new(ApiClient::new(&settings), &settings.base_url)
}

#[tokio::test]
async fn local_model_round_trip_over_http() {
    let addr = serve_model(http_response(
        "text/event-stream",
        concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi \"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"there\"}}]}\n\n",
            "data: [DONE]\n\n"
        ),
    ))
    .await;
    let model = local_model(addr);

    let (outcome, out) = drive(&model, None, "hello\nexit\n").await;

    assert_eq!(outcome, RunOutcome::Exited);
    assert!(
        out.contains(&format!("{READY_MESSAGE}\nHi there{}", separator_block())),
        "got: {out}"
    );
}

#[tokio::test]
async fn empty_reply_prints_only_the_separator() {
    let addr = serve_model(http_response(
        "application/json",
        r#"{"choices":[{"message":{"content":""}}]}"#,
    ))
    .await;
    let model = local_model(addr);

    let (outcome, out) = drive(&model, None, "hello\n").await;

    assert_eq!(outcome, RunOutcome::EndOfInput);
    assert!(!out.contains("An error occurred"), "got: {out}");
    assert!(
        out.ends_with(&format!("{READY_MESSAGE}\n{}", separator_block())),
        "got: {out}"
    );
}
