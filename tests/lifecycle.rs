//! End-to-end meeting lifecycle against the in-memory calling service.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use flexmeet::calls::{
    CallHandle, CallId, CallIdGenerator, CallParams, CallResourceClient, MemoryCallClient,
};
use flexmeet::identity::IdentityHandle;
use flexmeet::join::{
    DeviceSetup, JoinFlow, JoinFlowController, JoinFlowHandle, JoinPhase, RoomRenderer,
};
use flexmeet::session::{
    ActionState, CallCreator, DraftField, HomeSession, Notice, Panel, Route,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

const BASE_URL: &str = "https://meet.example.com";

struct CountingIds {
    next: AtomicUsize,
}

impl CallIdGenerator for CountingIds {
    fn generate(&self) -> CallId {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        CallId::parse(&format!("room-{}", n)).unwrap()
    }
}

struct Home {
    session: HomeSession,
    client: Arc<MemoryCallClient>,
    routes: UnboundedReceiver<Route>,
    notices: UnboundedReceiver<Notice>,
}

fn home() -> Home {
    let client = Arc::new(MemoryCallClient::new().with_creator("user_1"));
    let (route_tx, routes) = mpsc::unbounded_channel();
    let (notice_tx, notices) = mpsc::unbounded_channel();
    let notifier = Arc::new(notice_tx);

    let creator = CallCreator::new(
        client.clone(),
        Arc::new(CountingIds {
            next: AtomicUsize::new(1),
        }),
        notifier.clone(),
    );
    let session = HomeSession::new(
        creator,
        Arc::new(IdentityHandle::loaded(Some("user_1".to_string()))),
        Arc::new(route_tx),
        notifier,
        BASE_URL,
    );

    Home {
        session,
        client,
        routes,
        notices,
    }
}

struct AlwaysReady;

#[async_trait]
impl DeviceSetup for AlwaysReady {
    async fn confirm(&self, call: Option<&CallHandle>) -> anyhow::Result<bool> {
        Ok(call.is_some())
    }
}

#[derive(Default)]
struct RecordingRoom {
    entered: StdMutex<Vec<CallId>>,
}

#[async_trait]
impl RoomRenderer for RecordingRoom {
    async fn enter(&self, call: CallHandle) -> anyhow::Result<()> {
        self.entered.lock().unwrap().push(call.id);
        Ok(())
    }
}

#[tokio::test]
async fn test_instant_meeting_navigates_into_room() {
    let mut home = home();
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();

    home.session.select(ActionState::Schedule).await;
    home.session
        .update_draft(DraftField::StartTime(Some(start)))
        .await;
    home.session
        .update_draft(DraftField::Description(String::new()))
        .await;

    let created = home.session.submit().await.unwrap().unwrap();
    let expected_id = CallId::parse("room-1").unwrap();

    assert_eq!(created.handle.id, expected_id);
    assert_eq!(created.handle.starts_at, Some(start));
    assert_eq!(created.handle.description, "Instant Meeting");
    assert_eq!(home.client.len().await, 1);

    assert_eq!(home.notices.try_recv().unwrap(), Notice::MeetingCreated);
    let route = home.routes.try_recv().unwrap();
    assert_eq!(route, Route::Meeting(expected_id.clone()));
    assert_eq!(route.path(), "/meeting/room-1");
    assert!(home.routes.try_recv().is_err());

    let snapshot = home.session.snapshot().await;
    assert_eq!(snapshot.call.map(|c| c.id), Some(expected_id));
}

#[tokio::test]
async fn test_scheduled_meeting_stays_home_with_link() {
    let mut home = home();
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();

    home.session.select(ActionState::Schedule).await;
    home.session
        .update_draft(DraftField::StartTime(Some(start)))
        .await;
    home.session
        .update_draft(DraftField::Description("Team sync".to_string()))
        .await;

    let created = home.session.submit().await.unwrap().unwrap();
    assert_eq!(created.handle.description, "Team sync");
    assert!(created.navigation.is_none());
    assert!(home.routes.try_recv().is_err());

    let link = format!("{}/meeting/room-1", BASE_URL);
    assert_eq!(home.session.link().await, Some(link.clone()));
    assert_eq!(
        home.session.snapshot().await.panel,
        Panel::ScheduleCreated { link }
    );
}

#[tokio::test]
async fn test_created_meeting_can_be_joined_by_link() {
    let mut home = home();

    home.session.select(ActionState::Instant).await;
    home.session.submit().await.unwrap().unwrap();
    let Route::Meeting(id) = home.routes.try_recv().unwrap() else {
        panic!("expected a meeting route");
    };

    let controller = JoinFlowController::new(
        home.client.clone(),
        Arc::new(IdentityHandle::loaded(Some("user_2".to_string()))),
        Some(Duration::from_secs(5)),
    );
    let flow = JoinFlowHandle::new(id.clone());
    let room = RecordingRoom::default();

    assert!(controller.run(&flow, &AlwaysReady, &room).await.unwrap());
    assert_eq!(flow.phase().await, JoinPhase::InRoom);
    assert_eq!(*room.entered.lock().unwrap(), vec![id]);
}

#[tokio::test]
async fn test_identity_gates_setup_after_fetch_resolves() {
    let client = Arc::new(MemoryCallClient::new());
    let id = CallId::parse("standup").unwrap();
    client
        .create_or_get(&id, &CallParams::new(Utc::now(), "Standup"))
        .await
        .unwrap();

    let identity = IdentityHandle::new();
    let controller = Arc::new(JoinFlowController::new(
        client,
        Arc::new(identity.clone()),
        None,
    ));
    let flow = JoinFlowHandle::new(id);

    let task = {
        let controller = controller.clone();
        let flow = flow.clone();
        tokio::spawn(async move { controller.resolve(&flow).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(flow.phase().await, JoinPhase::Resolving);

    identity.set_loaded(Some("user_1".to_string()));
    assert_eq!(task.await.unwrap().unwrap(), JoinPhase::AwaitingSetup);

    let snapshot = flow.snapshot().await;
    assert_eq!(snapshot.call.unwrap().description, "Standup");
    assert!(!snapshot.setup_complete);
}

#[test]
fn test_resolution_order_does_not_matter() {
    let id = CallId::parse("abc").unwrap();
    let handle = CallHandle {
        id: id.clone(),
        starts_at: None,
        description: "Instant Meeting".to_string(),
        loading: false,
        created_by: None,
    };

    let mut identity_first = JoinFlow::new(id.clone());
    let ticket = identity_first.ticket();
    identity_first.identity_loaded(&ticket);
    assert_eq!(identity_first.phase(), JoinPhase::Resolving);
    identity_first.call_fetched(&ticket, Ok(Some(handle.clone())));

    let mut fetch_first = JoinFlow::new(id);
    let ticket = fetch_first.ticket();
    fetch_first.call_fetched(&ticket, Ok(Some(handle)));
    assert_eq!(fetch_first.phase(), JoinPhase::Resolving);
    fetch_first.identity_loaded(&ticket);

    for flow in [&mut identity_first, &mut fetch_first] {
        assert_eq!(flow.phase(), JoinPhase::AwaitingSetup);
        assert!(flow.room_call().is_none());
        flow.confirm_setup().unwrap();
        assert_eq!(flow.phase(), JoinPhase::InRoom);
        assert!(flow.room_call().is_some());
    }
}
