// SPDX-License-Identifier: MPL-2.0
//! Event sources feeding the command loop.
//!
//! Standard input, the session broadcast and a timer each run in their own
//! task and forward into one channel, so the loop reacts to whichever comes
//! first.

use super::Message;
use crate::application::session::SessionEvent;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Forwards every typed line as a parsed command.
pub fn input_lines(tx: mpsc::UnboundedSender<Message>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(Message::Input(line.parse())).is_err() {
                        break;
                    }
                }
                Ok(None) | Err(_) => {
                    let _ = tx.send(Message::InputClosed);
                    break;
                }
            }
        }
    })
}

/// Forwards session events until the session shuts down.
///
/// A lagging receiver skips the missed events; the next `status` reads the
/// snapshot anyway.
pub fn session_events(
    mut events: broadcast::Receiver<SessionEvent>,
    tx: mpsc::UnboundedSender<Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let last = event == SessionEvent::ShutDown;
                    if tx.send(Message::Session(event)).is_err() || last {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    eprintln!("[WARN] Missed {skipped} session events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Sends [`Message::Tick`] every `period`.
pub fn ticks(tx: mpsc::UnboundedSender<Message>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(Message::Tick).is_err() {
                break;
            }
        }
    })
}
