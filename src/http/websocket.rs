//! WebSocket echo/history endpoint.
//!
//! # Responsibilities
//! - Complete the upgrade handshake with the client
//! - Replay retained history to each new connection
//! - Echo text frames back and append them to the history
//!
//! # Design Decisions
//! - History is an explicit bounded queue owned here, shared only among
//!   WebSocket connections; the forwarding path never touches it
//! - Oldest entry is evicted first when the buffer is full
//! - Ping/pong is handled transparently by the framework; binary frames are
//!   ignored

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;

use crate::http::server::AppState;

/// Bounded message history for the echo endpoint.
///
/// Pushing beyond capacity evicts the oldest entry.
#[derive(Debug)]
pub struct MessageBuffer {
    capacity: usize,
    messages: VecDeque<String>,
}

impl MessageBuffer {
    /// Create a buffer holding at most `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            messages: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a message, evicting the oldest entry when full.
    pub fn push(&mut self, message: String) {
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// Retained messages, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Upgrade handler for the echo/history endpoint.
pub async fn ws_handler(State(state): State<AppState>, upgrade: WebSocketUpgrade) -> Response {
    let history = state.ws_history.clone();
    upgrade.on_upgrade(move |socket| handle_socket(socket, history))
}

async fn handle_socket(mut socket: WebSocket, history: Arc<Mutex<MessageBuffer>>) {
    let replay = {
        let buffer = history.lock().expect("history lock poisoned");
        buffer.snapshot()
    };
    for message in replay {
        if socket.send(Message::Text(message.into())).await.is_err() {
            return;
        }
    }

    while let Some(received) = socket.recv().await {
        match received {
            Ok(Message::Text(text)) => {
                {
                    let mut buffer = history.lock().expect("history lock poisoned");
                    buffer.push(text.to_string());
                }
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_when_full() {
        let mut buffer = MessageBuffer::new(3);
        for msg in ["a", "b", "c", "d"] {
            buffer.push(msg.to_string());
        }
        assert_eq!(buffer.snapshot(), vec!["b", "c", "d"]);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn snapshot_is_oldest_first() {
        let mut buffer = MessageBuffer::new(10);
        buffer.push("first".to_string());
        buffer.push("second".to_string());
        assert_eq!(buffer.snapshot(), vec!["first", "second"]);
    }

    #[test]
    fn zero_capacity_clamped_to_one() {
        let mut buffer = MessageBuffer::new(0);
        buffer.push("only".to_string());
        buffer.push("newer".to_string());
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.snapshot(), vec!["newer"]);
    }
}
