//! JSON-lines session loop over stdin/stdout. Each input line is parsed as JSON
//! and forwarded to core logic; every reply is written as one line. Timer
//! firings are merged into the same loop so state is only touched here.

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::logic::{handle_client_message, Flow};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::scheduler::{arm, Fired};
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Run until stdin closes, a `quit` arrives or ctrl-c.
pub async fn run_stdio(state: AppState) -> std::io::Result<()> {
  let input = BufReader::new(tokio::io::stdin());
  let output = tokio::io::stdout();
  run_session(state, input, output).await
}

#[instrument(level = "info", skip_all)]
pub async fn run_session<I, O>(mut state: AppState, input: I, mut output: O) -> std::io::Result<()>
where
  I: tokio::io::AsyncBufRead + Unpin,
  O: AsyncWrite + Unpin,
{
  info!(target: "shibu_engine", "Session started");
  let (tx, mut rx) = mpsc::unbounded_channel::<Fired>();
  let mut lines = input.lines();

  loop {
    let replies = tokio::select! {
      line = lines.next_line() => match line? {
        Some(txt) if txt.trim().is_empty() => continue,
        Some(txt) => {
          let (replies, flow) = match serde_json::from_str::<ClientMessage>(&txt) {
            Ok(incoming) => {
              debug!(target: "shibu_engine", "Received: {:?}", &incoming);
              handle_client_message(incoming, &mut state)
            }
            Err(e) => {
              warn!(target: "shibu_engine", line = %trunc_for_log(&txt, 120), error = %e, "Invalid JSON");
              (vec![ServerMessage::Error { message: format!("Invalid JSON: {}", e) }], Flow::Continue)
            }
          };
          if flow == Flow::Quit {
            write_all(&mut output, &replies).await?;
            break;
          }
          replies
        }
        None => break,
      },
      Some(fired) = rx.recv() => state.on_timer(fired),
      _ = tokio::signal::ctrl_c() => {
        info!(target: "shibu_engine", "Interrupted");
        break;
      }
    };

    for timer in state.take_timers() {
      arm(timer, tx.clone());
    }
    write_all(&mut output, &replies).await?;
  }
  info!(target: "shibu_engine", "Session ended");
  Ok(())
}

async fn write_all<O: AsyncWrite + Unpin>(output: &mut O, replies: &[ServerMessage]) -> std::io::Result<()> {
  for reply in replies {
    let out = serde_json::to_string(reply).unwrap_or_else(|e| {
      error!(target: "shibu_engine", error = %e, "Serialization error");
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    output.write_all(out.as_bytes()).await?;
    output.write_all(b"\n").await?;
  }
  output.flush().await
}
