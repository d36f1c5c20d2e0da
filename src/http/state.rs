use crate::feedback::{FeedbackGateway, FeedbackService};
use crate::session::{CallSnapshot, RunningCall};
use crate::store::Repository;
use crate::voice::VoiceClient;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// How many ended calls stay visible through `GET /api/calls/:id`
pub const FINISHED_CALL_CAPACITY: usize = 256;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Users, interviews and feedback
    pub repo: Repository,

    /// Server side of "create feedback"
    pub feedback: Arc<FeedbackService>,

    /// Where finished interview calls send their transcript
    pub gateway: Arc<dyn FeedbackGateway>,

    /// Opens remote voice calls
    pub voice: Arc<dyn VoiceClient>,

    /// Calls whose event loop is still running (call_id → tracked call)
    pub calls: Arc<RwLock<HashMap<String, TrackedCall>>>,

    /// Final snapshots of ended calls, oldest evicted first
    pub finished: Arc<RwLock<FinishedCalls>>,
}

/// A running call and the user who started it
pub struct TrackedCall {
    pub user_id: String,
    pub call: RunningCall,
}

/// Last known state of a call whose event loop has stopped
#[derive(Debug, Clone)]
pub struct FinishedCall {
    pub user_id: String,
    pub snapshot: CallSnapshot,
}

/// Bounded map of ended calls
#[derive(Debug)]
pub struct FinishedCalls {
    capacity: usize,
    order: VecDeque<String>,
    calls: HashMap<String, FinishedCall>,
}

impl FinishedCalls {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::new(),
            calls: HashMap::new(),
        }
    }

    pub fn insert(&mut self, call_id: String, call: FinishedCall) {
        if self.calls.insert(call_id.clone(), call).is_none() {
            self.order.push_back(call_id);
        }

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                debug!("Forgetting finished call {}", oldest);
                self.calls.remove(&oldest);
            }
        }
    }

    pub fn get(&self, call_id: &str) -> Option<&FinishedCall> {
        self.calls.get(call_id)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl AppState {
    pub fn new(
        repo: Repository,
        feedback: Arc<FeedbackService>,
        gateway: Arc<dyn FeedbackGateway>,
        voice: Arc<dyn VoiceClient>,
    ) -> Self {
        Self {
            repo,
            feedback,
            gateway,
            voice,
            calls: Arc::new(RwLock::new(HashMap::new())),
            finished: Arc::new(RwLock::new(FinishedCalls::new(FINISHED_CALL_CAPACITY))),
        }
    }

    /// Register a running call and retire it once its event loop stops
    pub async fn track_call(&self, call_id: String, user_id: String, call: RunningCall) {
        let closed = call.closed();
        self.calls
            .write()
            .await
            .insert(call_id.clone(), TrackedCall { user_id, call });

        let state = self.clone();
        tokio::spawn(async move {
            let snapshot = closed.await;
            state.retire_call(&call_id, snapshot).await;
        });
    }

    async fn retire_call(&self, call_id: &str, snapshot: CallSnapshot) {
        let user_id = match self.calls.read().await.get(call_id) {
            Some(tracked) => tracked.user_id.clone(),
            None => return,
        };

        // Visible as finished before it leaves the live registry
        self.finished.write().await.insert(
            call_id.to_string(),
            FinishedCall {
                user_id,
                snapshot: snapshot.clone(),
            },
        );
        self.calls.write().await.remove(call_id);

        info!("Call {} retired ({})", call_id, snapshot.status);
    }

    /// Latest snapshot of a call owned by `user_id`, running or ended
    pub async fn call_snapshot(&self, call_id: &str, user_id: &str) -> Option<CallSnapshot> {
        if let Some(tracked) = self
            .calls
            .read()
            .await
            .get(call_id)
            .filter(|c| c.user_id == user_id)
        {
            return Some(tracked.call.snapshot());
        }

        self.finished
            .read()
            .await
            .get(call_id)
            .filter(|c| c.user_id == user_id)
            .map(|c| c.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CallStatus;
    use chrono::Utc;

    fn finished(call_id: &str) -> FinishedCall {
        FinishedCall {
            user_id: "u1".to_string(),
            snapshot: CallSnapshot {
                call_id: call_id.to_string(),
                status: CallStatus::Finished,
                started_at: Utc::now(),
                transcript: Vec::new(),
                is_speaking: false,
                last_message: None,
                live_caption: None,
                last_error: None,
                outcome: None,
            },
        }
    }

    #[test]
    fn test_finished_calls_evict_oldest() {
        let mut calls = FinishedCalls::new(2);
        calls.insert("call-a".to_string(), finished("call-a"));
        calls.insert("call-b".to_string(), finished("call-b"));
        calls.insert("call-c".to_string(), finished("call-c"));

        assert_eq!(calls.len(), 2);
        assert!(calls.get("call-a").is_none());
        assert!(calls.get("call-b").is_some());
        assert!(calls.get("call-c").is_some());
    }

    #[test]
    fn test_finished_calls_reinsert_keeps_one_entry() {
        let mut calls = FinishedCalls::new(2);
        calls.insert("call-a".to_string(), finished("call-a"));
        calls.insert("call-a".to_string(), finished("call-a"));
        calls.insert("call-b".to_string(), finished("call-b"));

        assert_eq!(calls.len(), 2);
        assert!(calls.get("call-a").is_some());
    }
}
