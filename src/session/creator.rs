//! Call creation from a submitted draft.
//!
//! validate → generate id → create-or-get → report
//!
//! The creator never retries on its own. A retry is a fresh submission,
//! which gets a fresh call id.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::draft::MeetingDraft;
use super::signals::{Notice, Notifier, Route};
use crate::calls::{CallHandle, CallIdGenerator, CallParams, CallResourceClient};
use crate::identity::IdentitySnapshot;

#[derive(Debug, Error)]
pub enum CreationError {
    #[error("no start date and time selected")]
    MissingDateTime,
    #[error("calling service rejected the call: {0}")]
    RemoteFailure(#[source] anyhow::Error),
}

/// A call the service accepted, plus where the user should go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedCall {
    pub handle: CallHandle,
    /// Set for instant calls; scheduled calls stay on the current view.
    pub navigation: Option<Route>,
}

pub struct CallCreator {
    client: Arc<dyn CallResourceClient>,
    ids: Arc<dyn CallIdGenerator>,
    notifier: Arc<dyn Notifier>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CallCreator {
    pub fn new(
        client: Arc<dyn CallResourceClient>,
        ids: Arc<dyn CallIdGenerator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            ids,
            notifier,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Creates the call described by `draft`.
    ///
    /// Failures are announced here. The success notice is left to the
    /// caller, which knows whether the result is still wanted.
    ///
    /// Returns `Ok(None)` without side effects when the identity is not ready
    /// or another submission is still outstanding.
    pub async fn create_call(
        &self,
        draft: &MeetingDraft,
        identity: &IdentitySnapshot,
    ) -> Result<Option<CreatedCall>, CreationError> {
        if !identity.is_ready() {
            warn!("Ignoring call creation: identity not ready");
            return Ok(None);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Ignoring call creation: a submission is already in flight");
            return Ok(None);
        }
        let _guard = InFlight(&self.in_flight);

        let Some(start_time) = draft.start_time else {
            self.notifier.notify(Notice::MissingDateTime);
            return Err(CreationError::MissingDateTime);
        };

        let id = self.ids.generate();
        let params = CallParams::new(start_time, &draft.description);

        info!(
            "Creating call {} starting {} ({})",
            id, params.starts_at, params.description
        );

        let handle = match self.client.create_or_get(&id, &params).await {
            Ok(handle) => handle,
            Err(e) => {
                error!("Call {} creation failed: {:#}", id, e);
                self.notifier
                    .notify(Notice::CreationFailed(format!("{:#}", e)));
                return Err(CreationError::RemoteFailure(e));
            }
        };

        if handle.id != id {
            warn!(
                "Calling service returned call {} for requested id {}",
                handle.id, id
            );
        }

        let navigation = draft.is_instant().then(|| Route::Meeting(id.clone()));
        info!("Call {} created", id);

        Ok(Some(CreatedCall { handle, navigation }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calls::{CallId, UuidGenerator};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;
    use tokio::sync::{mpsc, Notify};

    #[derive(Default)]
    struct RecordingClient {
        requests: Mutex<Vec<(CallId, CallParams)>>,
        fail: bool,
    }

    #[async_trait]
    impl CallResourceClient for RecordingClient {
        async fn create_or_get(&self, id: &CallId, params: &CallParams) -> Result<CallHandle> {
            self.requests
                .lock()
                .unwrap()
                .push((id.clone(), params.clone()));
            if self.fail {
                return Err(anyhow!("service unavailable"));
            }
            Ok(CallHandle {
                id: id.clone(),
                starts_at: Some(params.starts_at),
                description: params.description.clone(),
                loading: false,
                created_by: None,
            })
        }

        async fn get_by_id(&self, _id: &CallId) -> Result<Option<CallHandle>> {
            Ok(None)
        }
    }

    struct FixedIds(&'static str);

    impl CallIdGenerator for FixedIds {
        fn generate(&self) -> CallId {
            CallId::parse(self.0).unwrap()
        }
    }

    fn ready() -> IdentitySnapshot {
        IdentitySnapshot {
            loaded: true,
            user: Some(crate::identity::UserIdentity {
                id: "user_1".into(),
            }),
        }
    }

    fn draft(description: &str) -> MeetingDraft {
        MeetingDraft {
            start_time: Some(Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()),
            description: description.to_string(),
            join_link: String::new(),
        }
    }

    fn creator(
        client: Arc<RecordingClient>,
    ) -> (CallCreator, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            CallCreator::new(client, Arc::new(UuidGenerator), Arc::new(tx)),
            rx,
        )
    }

    #[tokio::test]
    async fn test_missing_start_time_never_calls_service() {
        let client = Arc::new(RecordingClient::default());
        let (creator, mut notices) = creator(client.clone());
        let mut draft = draft("Team sync");
        draft.start_time = None;

        let result = creator.create_call(&draft, &ready()).await;

        assert!(matches!(result, Err(CreationError::MissingDateTime)));
        assert!(client.requests.lock().unwrap().is_empty());
        assert_eq!(notices.try_recv().unwrap(), Notice::MissingDateTime);
        assert!(!creator.is_submitting());
    }

    #[tokio::test]
    async fn test_not_ready_identity_is_silent_noop() {
        let client = Arc::new(RecordingClient::default());
        let (creator, mut notices) = creator(client.clone());

        let unloaded = IdentitySnapshot::default();
        assert!(creator.create_call(&draft(""), &unloaded).await.unwrap().is_none());

        let signed_out = IdentitySnapshot {
            loaded: true,
            user: None,
        };
        assert!(creator.create_call(&draft(""), &signed_out).await.unwrap().is_none());

        assert!(client.requests.lock().unwrap().is_empty());
        assert!(notices.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_instant_call_requests_navigation() {
        let client = Arc::new(RecordingClient::default());
        let (tx, mut notices) = mpsc::unbounded_channel();
        let creator = CallCreator::new(client.clone(), Arc::new(FixedIds("call-1")), Arc::new(tx));

        let created = creator
            .create_call(&draft(""), &ready())
            .await
            .unwrap()
            .unwrap();

        let id = CallId::parse("call-1").unwrap();
        assert_eq!(created.handle.id, id);
        assert_eq!(created.navigation, Some(Route::Meeting(id.clone())));

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, id);
        assert_eq!(requests[0].1.description, "Instant Meeting");
        assert!(notices.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_scheduled_call_stays_put() {
        let client = Arc::new(RecordingClient::default());
        let (creator, _notices) = creator(client.clone());

        let created = creator
            .create_call(&draft("Team sync"), &ready())
            .await
            .unwrap()
            .unwrap();

        assert!(created.navigation.is_none());
        assert_eq!(created.handle.description, "Team sync");
    }

    #[tokio::test]
    async fn test_remote_failure_is_reported() {
        let client = Arc::new(RecordingClient {
            fail: true,
            ..Default::default()
        });
        let (creator, mut notices) = creator(client.clone());

        let result = creator.create_call(&draft("Team sync"), &ready()).await;

        match result {
            Err(CreationError::RemoteFailure(e)) => {
                assert!(e.to_string().contains("service unavailable"))
            }
            other => panic!("expected remote failure, got {:?}", other),
        }
        assert!(matches!(
            notices.try_recv().unwrap(),
            Notice::CreationFailed(_)
        ));
        assert!(!creator.is_submitting());
    }

    #[tokio::test]
    async fn test_each_submission_gets_a_fresh_id() {
        let client = Arc::new(RecordingClient::default());
        let (creator, _notices) = creator(client.clone());

        let first = creator.create_call(&draft(""), &ready()).await.unwrap().unwrap();
        let second = creator.create_call(&draft(""), &ready()).await.unwrap().unwrap();

        assert_ne!(first.handle.id, second.handle.id);
        assert_eq!(client.requests.lock().unwrap().len(), 2);
    }

    struct GatedClient {
        gate: Notify,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl CallResourceClient for GatedClient {
        async fn create_or_get(&self, id: &CallId, params: &CallParams) -> Result<CallHandle> {
            *self.calls.lock().unwrap() += 1;
            self.gate.notified().await;
            Ok(CallHandle {
                id: id.clone(),
                starts_at: Some(params.starts_at),
                description: params.description.clone(),
                loading: false,
                created_by: None,
            })
        }

        async fn get_by_id(&self, _id: &CallId) -> Result<Option<CallHandle>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_double_submit_is_ignored_while_in_flight() {
        let client = Arc::new(GatedClient {
            gate: Notify::new(),
            calls: Mutex::new(0),
        });
        let (tx, _notices) = mpsc::unbounded_channel();
        let creator = Arc::new(CallCreator::new(
            client.clone(),
            Arc::new(UuidGenerator),
            Arc::new(tx),
        ));

        let first = {
            let creator = creator.clone();
            tokio::spawn(async move { creator.create_call(&draft(""), &ready()).await })
        };

        while !creator.is_submitting() {
            tokio::task::yield_now().await;
        }

        let second = creator.create_call(&draft(""), &ready()).await.unwrap();
        assert!(second.is_none());

        client.gate.notify_one();
        let first = first.await.unwrap().unwrap();
        assert!(first.is_some());
        assert_eq!(*client.calls.lock().unwrap(), 1);
    }
}
