//! Exchange lifecycle tests
//!
//! These drive a `Chat` end to end against scripted in-memory backends and
//! check what a surface would observe:
//! - single-flight submissions
//! - local rejection of empty input
//! - question/answer round trips and the history sent with each question
//! - recovery from transport failures
//! - cancellation of a running reveal
//! - stale completions after a reset

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::sync::{mpsc, Semaphore};

use lolgpt_core::{
    AnswerBackend, AskRequest, Chat, ChatMessage, ChatOptions, ChatState, Message, SubmitError,
    TransportError,
};

// =============================================================================
// Scripted backend
// =============================================================================

struct Inner {
    replies: Mutex<VecDeque<Result<String, TransportError>>>,
    requests: Mutex<Vec<AskRequest>>,
    gate: Option<Semaphore>,
}

/// Answers from a script, optionally holding each answer until released
#[derive(Clone)]
struct ScriptedBackend {
    inner: Arc<Inner>,
}

impl ScriptedBackend {
    fn new(replies: Vec<Result<String, TransportError>>) -> Self {
        Self::build(replies, None)
    }

    fn gated(replies: Vec<Result<String, TransportError>>) -> Self {
        Self::build(replies, Some(Semaphore::new(0)))
    }

    fn build(replies: Vec<Result<String, TransportError>>, gate: Option<Semaphore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
                gate,
            }),
        }
    }

    fn release(&self) {
        if let Some(ref gate) = self.inner.gate {
            gate.add_permits(1);
        }
    }

    fn calls(&self) -> usize {
        self.inner.requests.lock().len()
    }

    fn requests(&self) -> Vec<AskRequest> {
        self.inner.requests.lock().clone()
    }
}

#[async_trait]
impl AnswerBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn ask(&self, request: &AskRequest) -> Result<String, TransportError> {
        self.inner.requests.lock().push(request.clone());

        if let Some(ref gate) = self.inner.gate {
            gate.acquire().await.map(|permit| permit.forget()).ok();
        }

        self.inner
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".to_string())))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn options() -> ChatOptions {
    ChatOptions {
        reveal_interval: Duration::from_millis(1),
        ..Default::default()
    }
}

fn chat(
    backend: &ScriptedBackend,
) -> (Chat<ScriptedBackend>, mpsc::UnboundedReceiver<ChatMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Chat::new(backend.clone(), options(), tx), rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ChatMessage>) -> Vec<ChatMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

fn progress(messages: &[ChatMessage]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|msg| match msg {
            ChatMessage::RevealProgress { partial, .. } => Some(partial.clone()),
            _ => None,
        })
        .collect()
}

async fn run_until_idle(chat: &mut Chat<ScriptedBackend>) {
    while chat.is_pending() {
        chat.wait().await;
    }
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn test_second_submit_while_pending_is_rejected() {
    let backend = ScriptedBackend::gated(vec![Ok("Go Ahri.".to_string())]);
    let (mut chat, _rx) = chat(&backend);

    assert!(chat.submit("Who should I play mid?").is_ok());
    assert_eq!(
        chat.submit("Actually, top?"),
        Err(SubmitError::ConcurrentSubmission)
    );
    assert_eq!(chat.conversation(), &[Message::user("Who should I play mid?")]);

    backend.release();
    run_until_idle(&mut chat).await;

    assert_eq!(backend.calls(), 1);
    assert_eq!(
        chat.conversation(),
        &[
            Message::user("Who should I play mid?"),
            Message::assistant("Go Ahri."),
        ]
    );
}

#[tokio::test]
async fn test_rejected_while_revealing() {
    let backend = ScriptedBackend::new(vec![Ok("A long answer".to_string())]);
    let (mut chat, _rx) = chat(&backend);

    chat.submit("Q").unwrap();
    while chat.state() != ChatState::Revealing {
        chat.wait().await;
    }

    assert_eq!(chat.submit("Q2"), Err(SubmitError::ConcurrentSubmission));
    run_until_idle(&mut chat).await;
    assert_eq!(chat.conversation().len(), 2);
}

#[tokio::test]
async fn test_empty_input_touches_nothing() {
    let backend = ScriptedBackend::new(vec![]);
    let (mut chat, mut rx) = chat(&backend);

    assert_eq!(chat.submit(""), Err(SubmitError::EmptyInput));
    assert_eq!(chat.submit("  \n\t "), Err(SubmitError::EmptyInput));

    tokio::task::yield_now().await;
    assert!(!chat.poll());

    assert!(chat.conversation().is_empty());
    assert!(!chat.is_pending());
    assert_eq!(backend.calls(), 0);
    assert!(drain(&mut rx).is_empty());
}

// =============================================================================
// Round trips
// =============================================================================

#[tokio::test]
async fn test_round_trip_appends_question_then_answer() {
    let backend = ScriptedBackend::new(vec![
        Ok("Jinx.".to_string()),
        Ok("Thresh.".to_string()),
    ]);
    let (mut chat, _rx) = chat(&backend);

    chat.submit("Best ADC?").unwrap();
    run_until_idle(&mut chat).await;

    let accepted = chat.submit("Best support?").unwrap();
    assert_eq!(accepted.history_len, 3);
    run_until_idle(&mut chat).await;

    assert_eq!(
        chat.conversation(),
        &[
            Message::user("Best ADC?"),
            Message::assistant("Jinx."),
            Message::user("Best support?"),
            Message::assistant("Thresh."),
        ]
    );

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].question, "Best ADC?");
    assert_eq!(requests[0].history.messages(), &[Message::user("Best ADC?")]);
    assert_eq!(requests[1].question, "Best support?");
    assert_eq!(
        requests[1].history.messages(),
        &[
            Message::user("Best ADC?"),
            Message::assistant("Jinx."),
            Message::user("Best support?"),
        ]
    );
}

#[tokio::test]
async fn test_surface_sees_ordered_exchange() {
    let backend = ScriptedBackend::new(vec![Ok("ok".to_string())]);
    let (mut chat, mut rx) = chat(&backend);

    let accepted = chat.submit("ff?").unwrap();
    run_until_idle(&mut chat).await;

    let exchange = accepted.exchange;
    assert_eq!(
        drain(&mut rx),
        vec![
            ChatMessage::Appended {
                index: 0,
                message: Message::user("ff?"),
            },
            ChatMessage::Typing { active: true },
            ChatMessage::State {
                state: ChatState::AwaitingAnswer,
            },
            ChatMessage::State {
                state: ChatState::Revealing,
            },
            ChatMessage::RevealProgress {
                exchange,
                partial: "o".to_string(),
            },
            ChatMessage::RevealProgress {
                exchange,
                partial: "ok".to_string(),
            },
            ChatMessage::Appended {
                index: 1,
                message: Message::assistant("ok"),
            },
            ChatMessage::Typing { active: false },
            ChatMessage::State {
                state: ChatState::Ready,
            },
        ]
    );
}

#[tokio::test]
async fn test_multibyte_answer_reveals_whole_characters() {
    let backend = ScriptedBackend::new(vec![Ok("né🙂".to_string())]);
    let (mut chat, mut rx) = chat(&backend);

    chat.submit("emoji?").unwrap();
    run_until_idle(&mut chat).await;

    assert_eq!(
        progress(&drain(&mut rx)),
        vec!["n".to_string(), "né".to_string(), "né🙂".to_string()]
    );
    assert_eq!(chat.conversation()[1], Message::assistant("né🙂"));
}

#[tokio::test]
async fn test_empty_answer_commits_without_progress() {
    let backend = ScriptedBackend::new(vec![Ok(String::new())]);
    let (mut chat, mut rx) = chat(&backend);

    chat.submit("anything?").unwrap();
    run_until_idle(&mut chat).await;

    assert!(progress(&drain(&mut rx)).is_empty());
    assert_eq!(
        chat.conversation(),
        &[Message::user("anything?"), Message::assistant("")]
    );
    assert!(!chat.typing());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_transport_error_keeps_question_and_recovers() {
    let backend = ScriptedBackend::new(vec![
        Err(TransportError::Status {
            status: 400,
            message: "No question provided".to_string(),
        }),
        Ok("Second time lucky.".to_string()),
    ]);
    let (mut chat, mut rx) = chat(&backend);

    let first = chat.submit("Q1").unwrap();
    run_until_idle(&mut chat).await;

    assert_eq!(chat.conversation(), &[Message::user("Q1")]);
    assert!(!chat.typing());
    assert_eq!(chat.state(), ChatState::Ready);
    assert_eq!(
        chat.last_error(),
        Some("Answer service returned 400: No question provided")
    );

    let messages = drain(&mut rx);
    assert!(messages.contains(&ChatMessage::Error {
        exchange: first.exchange,
        error: "Answer service returned 400: No question provided".to_string(),
    }));
    assert!(progress(&messages).is_empty());

    // The gate is usable again and the error clears on the next exchange
    chat.submit("Q2").unwrap();
    assert_eq!(chat.last_error(), None);
    run_until_idle(&mut chat).await;

    assert_eq!(
        chat.conversation(),
        &[
            Message::user("Q1"),
            Message::user("Q2"),
            Message::assistant("Second time lucky."),
        ]
    );
    assert_eq!(backend.calls(), 2);
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_shutdown_after_ticks_stops_reveal() {
    let backend = ScriptedBackend::new(vec![Ok("Baron is up".to_string())]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut chat = Chat::new(
        backend.clone(),
        ChatOptions {
            reveal_interval: Duration::from_millis(15),
            ..Default::default()
        },
        tx,
    );

    chat.submit("Objectives?").unwrap();

    let mut seen = Vec::new();
    while seen.len() < 3 {
        chat.wait().await;
        seen.extend(progress(&drain(&mut rx)));
    }
    assert_eq!(seen, vec!["B", "Ba", "Bar"]);
    assert_eq!(chat.pending().map(|p| p.cursor()), Some(3));

    chat.shutdown();
    tokio::time::sleep(Duration::from_secs(1)).await;
    chat.poll();

    let after = drain(&mut rx);
    assert!(progress(&after).is_empty());
    assert!(!after
        .iter()
        .any(|msg| matches!(msg, ChatMessage::Appended { .. })));
    assert_eq!(chat.conversation(), &[Message::user("Objectives?")]);
    assert_eq!(chat.state(), ChatState::ShuttingDown);
}

#[tokio::test(start_paused = true)]
async fn test_reset_before_first_tick() {
    let backend = ScriptedBackend::new(vec![Ok("gg".to_string())]);
    let (mut chat, mut rx) = chat(&backend);

    chat.submit("ff at 15?").unwrap();
    while chat.state() != ChatState::Revealing {
        chat.wait().await;
    }
    chat.reset();
    drain(&mut rx);

    tokio::time::sleep(Duration::from_secs(1)).await;
    chat.poll();

    assert!(drain(&mut rx).is_empty());
    assert!(chat.conversation().is_empty());
}

#[tokio::test]
async fn test_late_answer_after_reset_is_ignored() {
    let backend = ScriptedBackend::gated(vec![
        Ok("stale".to_string()),
        Ok("fresh".to_string()),
    ]);
    let (mut chat, mut rx) = chat(&backend);

    chat.submit("old question").unwrap();
    chat.reset();
    assert!(!chat.is_pending());

    // The old request completes after the reset
    backend.release();
    tokio::time::sleep(Duration::from_millis(50)).await;
    chat.poll();

    assert!(chat.conversation().is_empty());
    let messages = drain(&mut rx);
    assert!(matches!(
        messages.last(),
        Some(ChatMessage::SessionReset { .. })
    ));

    // A new exchange in the new session works normally
    chat.submit("new question").unwrap();
    backend.release();
    run_until_idle(&mut chat).await;

    assert_eq!(
        chat.conversation(),
        &[Message::user("new question"), Message::assistant("fresh")]
    );
    assert_eq!(
        backend.requests()[1].history.messages(),
        &[Message::user("new question")]
    );
}
