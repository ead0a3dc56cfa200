use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use boxwatch_core::{FeedRequest, UnitId};
use sync_logging::{sync_debug, sync_error, sync_info};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::fetch::{ClientSettings, JobRunnerApi, ReqwestJobRunner};
use crate::EngineEvent;

pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

enum Request {
    UnitCount,
    Logs(FeedRequest),
    States(FeedRequest),
    UnitDetail(UnitId),
    Reset(i64),
}

enum EngineCommand {
    Request(Request),
    SetServer(String),
    StartPoller(Duration),
    Shutdown,
}

/// Handle to the engine thread. Requests go in as commands and results come
/// back as [`EngineEvent`]s in completion order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings, address: &str) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let api: Arc<dyn JobRunnerApi> =
            Arc::new(ReqwestJobRunner::new(settings.clone(), address));

        thread::spawn(move || run_engine(settings, api, cmd_rx, event_tx));

        Self { cmd_tx, event_rx }
    }

    pub fn fetch_unit_count(&self) {
        self.send(EngineCommand::Request(Request::UnitCount));
    }

    pub fn fetch_logs(&self, request: FeedRequest) {
        self.send(EngineCommand::Request(Request::Logs(request)));
    }

    pub fn fetch_states(&self, request: FeedRequest) {
        self.send(EngineCommand::Request(Request::States(request)));
    }

    pub fn fetch_unit_detail(&self, unit: UnitId) {
        self.send(EngineCommand::Request(Request::UnitDetail(unit)));
    }

    pub fn reset_unit(&self, unit_id: i64) {
        self.send(EngineCommand::Request(Request::Reset(unit_id)));
    }

    /// Points later requests at a new server. Requests already in flight finish
    /// against the old one.
    pub fn set_server(&self, address: impl Into<String>) {
        self.send(EngineCommand::SetServer(address.into()));
    }

    /// Starts posting [`EngineEvent::PollTick`], the first one immediately.
    /// A second call replaces the running timer.
    pub fn start_poller(&self, interval: Duration) {
        self.send(EngineCommand::StartPoller(interval));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            sync_error!("Engine thread is gone; dropping command");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

fn run_engine(
    settings: ClientSettings,
    mut api: Arc<dyn JobRunnerApi>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            sync_error!("Failed to start tokio runtime: {}", err);
            return;
        }
    };
    let shutdown = CancellationToken::new();
    let mut poller: Option<CancellationToken> = None;

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Shutdown => break,
            EngineCommand::SetServer(address) => {
                sync_info!("Engine now talking to {}", address);
                api = Arc::new(ReqwestJobRunner::new(settings.clone(), &address));
            }
            EngineCommand::StartPoller(interval) => {
                if let Some(previous) = poller.take() {
                    previous.cancel();
                }
                let token = shutdown.child_token();
                runtime.spawn(run_poller(interval, token.clone(), event_tx.clone()));
                poller = Some(token);
            }
            EngineCommand::Request(request) => {
                let api = api.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event = handle_request(api.as_ref(), request).await;
                    let _ = event_tx.send(event);
                });
            }
        }
    }

    sync_debug!("Engine shutting down");
    shutdown.cancel();
    runtime.shutdown_timeout(Duration::from_millis(200));
}

async fn run_poller(
    interval: Duration,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                if event_tx.send(EngineEvent::PollTick).is_err() {
                    break;
                }
            }
        }
    }
}

async fn handle_request(api: &dyn JobRunnerApi, request: Request) -> EngineEvent {
    match request {
        Request::UnitCount => EngineEvent::UnitCount(api.unit_count().await),
        Request::Logs(request) => EngineEvent::Logs {
            seq: request.seq,
            result: api.logs(request.after).await,
        },
        Request::States(request) => EngineEvent::States {
            seq: request.seq,
            result: api.states(request.after).await,
        },
        Request::UnitDetail(unit) => EngineEvent::UnitDetail {
            unit,
            result: api.unit_detail(unit).await,
        },
        Request::Reset(unit_id) => EngineEvent::ResetCompleted {
            unit_id,
            result: api.reset(unit_id).await,
        },
    }
}
