//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeSet, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::{Mutex, MutexGuard};

use crate::api::{ApiError, ApiFuture, ApiRequest, ApiResponse, Method, PnapClient, Transport};

/// Scripted transport that returns pre-seeded responses in FIFO order.
///
/// Used to drive deterministic API outcomes without a network. Every request
/// is recorded so tests can assert on the calls a handler made.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTransport {
    responses: Arc<StdMutex<VecDeque<ApiResponse>>>,
    requests: Arc<StdMutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    /// Creates a transport with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a client backed by this transport.
    #[must_use]
    pub fn client(&self) -> PnapClient {
        PnapClient::new(Arc::new(self.clone()))
    }

    /// Returns a snapshot of all requests recorded so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `(method, full path)` pairs for compact assertions.
    #[must_use]
    pub fn calls(&self) -> Vec<(Method, String)> {
        self.requests()
            .iter()
            .map(|request| (request.method, request.full_path()))
            .collect()
    }

    /// Number of responses not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Pushes a 200 response carrying a JSON document.
    pub fn push_json(&self, value: &serde_json::Value) {
        self.push_response(ApiResponse::json(value));
    }

    /// Pushes an empty 204 response.
    pub fn push_empty(&self) {
        self.push_response(ApiResponse {
            status: 204,
            body: Vec::new(),
        });
    }

    /// Pushes a raw status and body, typically an API error.
    pub fn push_status(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.push_response(ApiResponse {
            status,
            body: body.into(),
        });
    }

    /// Pushes an explicit response.
    pub fn push_response(&self, response: ApiResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: ApiRequest) -> ApiFuture<'_, ApiResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        Box::pin(async move {
            next.ok_or_else(|| ApiError::Transport {
                message: String::from("no scripted response available"),
            })
        })
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        Self::apply(pairs, &[]).await
    }

    /// Sets `pairs` and clears `cleared` while holding the global mutex.
    pub async fn apply(pairs: &[(&str, &str)], cleared: &[&str]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs
                    .iter()
                    .map(|(key, _)| *key)
                    .chain(cleared.iter().copied())
                    .all(|key| seen.insert(key))
            },
            "duplicate environment variable keys passed to EnvGuard"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len() + cleared.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }
        for key in cleared {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::remove_var(key) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
