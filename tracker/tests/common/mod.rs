#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, routing::any, Router};

/// Canned reply served for every request to the stub host.
#[derive(Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Clone)]
pub struct Stub {
    pub base: String,
    reply: Arc<Mutex<Reply>>,
    hits: Arc<Mutex<usize>>,
}

impl Stub {
    pub fn set(&self, status: StatusCode, body: impl Into<String>) {
        *self.reply.lock().unwrap() = Reply {
            status,
            body: body.into(),
        };
    }

    pub fn hits(&self) -> usize {
        *self.hits.lock().unwrap()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

#[derive(Clone)]
struct StubState {
    reply: Arc<Mutex<Reply>>,
    hits: Arc<Mutex<usize>>,
}

async fn respond(State(state): State<StubState>) -> (StatusCode, String) {
    *state.hits.lock().unwrap() += 1;
    let reply = state.reply.lock().unwrap().clone();
    (reply.status, reply.body)
}

/// Start an HTTP server on a free local port that answers every path with
/// the current reply.
pub async fn spawn_stub(status: StatusCode, body: &str) -> Stub {
    let reply = Arc::new(Mutex::new(Reply {
        status,
        body: body.to_string(),
    }));
    let hits = Arc::new(Mutex::new(0));

    let app = Router::new()
        .route("/*path", any(respond))
        .with_state(StubState {
            reply: reply.clone(),
            hits: hits.clone(),
        });

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Stub {
        base: format!("http://{}", addr),
        reply,
        hits,
    }
}

pub fn profile_response(username: &str, ranking: u64) -> String {
    serde_json::json!({
        "data": {
            "matchedUser": {
                "username": username,
                "profile": {
                    "ranking": ranking,
                    "userAvatar": "https://example.com/avatar.png",
                    "realName": "Test User"
                },
                "submitStats": {
                    "acSubmissionNum": [
                        {"difficulty": "All", "count": 12, "submissions": 30},
                        {"difficulty": "Easy", "count": 7, "submissions": 15},
                        {"difficulty": "Medium", "count": 4, "submissions": 12},
                        {"difficulty": "Hard", "count": 1, "submissions": 3}
                    ]
                }
            }
        }
    })
    .to_string()
}
