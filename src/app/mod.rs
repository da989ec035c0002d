use crate::api::{ApiServer, MeetingState, SessionState};
use crate::calls::{self, CallResourceClient, UuidGenerator};
use crate::config::Config;
use crate::identity::IdentityHandle;
use crate::join::JoinFlowController;
use crate::session::{CallCreator, HomeSession, LogNotifier, Navigator, Notifier, Route};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Collaborators shared by the HTTP service and the command line.
pub struct Services {
    pub config: Config,
    pub client: Arc<dyn CallResourceClient>,
    pub identity: IdentityHandle,
}

impl Services {
    pub fn from_config(config: Config) -> Result<Self> {
        let user_id = resolve_user_id(&config);
        let client = calls::build_client(&config.calls, user_id.as_deref())?;
        let identity = IdentityHandle::loaded(user_id);

        Ok(Self {
            config,
            client,
            identity,
        })
    }

    pub fn home_session(
        &self,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> HomeSession {
        let creator = CallCreator::new(
            Arc::clone(&self.client),
            Arc::new(UuidGenerator),
            Arc::clone(&notifier),
        );
        HomeSession::new(
            creator,
            Arc::new(self.identity.clone()),
            navigator,
            notifier,
            self.config.service.base_url.clone(),
        )
    }

    pub fn join_controller(&self) -> JoinFlowController {
        JoinFlowController::new(
            Arc::clone(&self.client),
            Arc::new(self.identity.clone()),
            self.config.join.resolve_timeout(),
        )
    }
}

fn resolve_user_id(config: &Config) -> Option<String> {
    config
        .identity
        .user_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .or_else(|| std::env::var("USER").ok())
}

pub async fn run_service() -> Result<()> {
    info!("Starting flexmeet service");

    let config = Config::load()?;
    let port = config.service.port;
    let services = Services::from_config(config)?;

    let (nav_tx, mut nav_rx) = mpsc::unbounded_channel::<Route>();
    let home = Arc::new(services.home_session(Arc::new(nav_tx), Arc::new(LogNotifier)));
    let controller = Arc::new(services.join_controller());

    let api_server = ApiServer::new(
        port,
        SessionState::new(home),
        MeetingState::new(controller),
    );
    tokio::spawn(async move {
        if let Err(e) = api_server.start().await {
            error!("API server failed: {}", e);
        }
    });

    info!("flexmeet is ready!");
    info!("Open a session: curl http://127.0.0.1:{}/session", port);

    while let Some(route) = nav_rx.recv().await {
        match &route {
            Route::Meeting(id) => info!("Navigate to meeting room {} ({})", id, route),
            Route::Recordings => info!("Navigate to recordings ({})", route),
            Route::Home => info!("Navigate home"),
        }
    }

    Ok(())
}
