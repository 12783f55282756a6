//! Interactive terminal chat against the Horizon backend.

use std::io::{self, BufRead, Write};

use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use horizon::client::HorizonClient;
use horizon::config::Config;
use horizon::models::QuizStreamRequest;
use horizon::session::{stream_quiz, CancelToken, ChatState, TurnOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env();
    let client = HorizonClient::new(&config.base_url);

    match client.health_check().await {
        Ok(true) => {}
        Ok(false) => eprintln!("warning: backend at {} is not healthy", config.base_url),
        Err(e) => eprintln!(
            "warning: could not reach backend at {}: {}",
            config.base_url, e
        ),
    }

    println!("Horizon chat ({})", config.base_url);
    println!("Commands: /reset, /history, /quiz <topic>, /quit");

    let mut state = ChatState::new();
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if input == "/quit" || input == "/exit" {
            break;
        } else if input == "/reset" {
            reset(&client, &mut state).await;
        } else if input == "/history" {
            show_history(&client, &mut state).await;
        } else if let Some(topic) = input.strip_prefix("/quiz") {
            run_quiz(&client, &mut state, topic.trim()).await;
        } else {
            run_chat_turn(&client, &mut state, input).await;
        }
    }

    Ok(())
}

/// Run one chat turn, printing tokens as they arrive. Ctrl-C cancels the
/// in-flight stream without exiting the program.
async fn run_chat_turn(client: &HorizonClient, state: &mut ChatState, text: &str) {
    let cancel = CancelToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let outcome = state
        .send_with(client, text, cancel, |fragment| {
            print!("{fragment}");
            let _ = io::stdout().flush();
        })
        .await;
    watcher.abort();
    println!();

    match outcome {
        TurnOutcome::Completed => {}
        TurnOutcome::Failed => {
            if let Some(error) = state.stream_error() {
                eprintln!("error: {error}");
            }
        }
        TurnOutcome::Cancelled => println!("(cancelled)"),
        TurnOutcome::Busy => println!("A response is still streaming."),
    }
}

async fn reset(client: &HorizonClient, state: &mut ChatState) {
    if let Some(old_session) = state.reset_session() {
        if let Err(e) = client.reset(&old_session).await {
            eprintln!("reset failed: {e}");
        }
    }
    println!("Session cleared.");
}

async fn show_history(client: &HorizonClient, state: &mut ChatState) {
    let session_id = state.session_id().to_string();
    match client.history(&session_id).await {
        Ok(history) => {
            if history.messages.is_empty() {
                println!("No persisted messages for this session.");
            }
            for message in history.messages {
                println!("[{}] {}", message.role, message.content);
            }
        }
        Err(e) => eprintln!("history failed: {e}"),
    }
}

/// Stream a generated quiz. Uses the same frame format as chat, so the
/// consumption mirrors a turn without touching the transcript. Ctrl-C
/// cancels the stream just like a chat turn.
async fn run_quiz(client: &HorizonClient, state: &mut ChatState, topic: &str) {
    if topic.is_empty() {
        println!("usage: /quiz <topic>");
        return;
    }

    let request = QuizStreamRequest::new(state.session_id(), topic);
    let cancel = CancelToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let (outcome, error) = stream_quiz(client, &request, &cancel, |fragment| {
        print!("{fragment}");
        let _ = io::stdout().flush();
    })
    .await;
    watcher.abort();
    println!();

    match outcome {
        TurnOutcome::Completed => {}
        TurnOutcome::Failed => {
            if let Some(error) = error {
                eprintln!("quiz failed: {error}");
            }
        }
        TurnOutcome::Cancelled => println!("(cancelled)"),
        TurnOutcome::Busy => {}
    }
}
