use std::path::PathBuf;

use boxwatch_core::{Effect, Msg};
use boxwatch_engine::{ClientSettings, EngineEvent, EngineHandle, POLL_INTERVAL};
use sync_logging::{sync_debug, sync_info, sync_warn};

use super::persistence::{save_settings, Settings};

/// Executes core effects against the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    state_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings, server_address: &str, state_dir: PathBuf) -> Self {
        let engine = EngineHandle::new(settings, server_address);
        Self { engine, state_dir }
    }

    pub fn start_polling(&self) {
        self.engine.start_poller(POLL_INTERVAL);
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchUnitCount => self.engine.fetch_unit_count(),
                Effect::FetchLogs { request } => {
                    sync_debug!("FetchLogs seq={} after={}", request.seq, request.after);
                    self.engine.fetch_logs(request);
                }
                Effect::FetchStates { request } => {
                    sync_debug!("FetchStates seq={} after={}", request.seq, request.after);
                    self.engine.fetch_states(request);
                }
                Effect::FetchUnitDetail { unit } => self.engine.fetch_unit_detail(unit),
                Effect::ResetUnit { unit_id } => {
                    sync_info!("Resetting unit {}", unit_id);
                    self.engine.reset_unit(unit_id);
                }
                Effect::ServerAddressChanged { address } => {
                    save_settings(
                        &self.state_dir,
                        &Settings {
                            server_address: address.clone(),
                        },
                    );
                    self.engine.set_server(address);
                }
            }
        }
    }

    /// Engine results that arrived since the last call, in arrival order.
    pub fn drain(&self) -> Vec<Msg> {
        std::iter::from_fn(|| self.engine.try_recv())
            .map(event_to_msg)
            .collect()
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PollTick => Msg::PollTick,
        EngineEvent::UnitCount(Ok(total_units)) => Msg::UnitCountLoaded(total_units),
        EngineEvent::UnitCount(Err(err)) => {
            sync_warn!("Unit count failed: {}", err);
            Msg::UnitCountFailed {
                error: err.to_string(),
            }
        }
        EngineEvent::Logs { seq, result } => match result {
            Ok(entries) => Msg::LogsFetched { seq, entries },
            Err(err) => Msg::LogsFailed {
                seq,
                error: err.to_string(),
            },
        },
        EngineEvent::States { seq, result } => match result {
            Ok(records) => Msg::StatesFetched { seq, records },
            Err(err) => Msg::StatesFailed {
                seq,
                error: err.to_string(),
            },
        },
        EngineEvent::UnitDetail { unit, result } => match result {
            Ok(snapshot) => Msg::UnitDetailLoaded { unit, snapshot },
            Err(err) => Msg::UnitDetailFailed {
                unit,
                error: err.to_string(),
            },
        },
        EngineEvent::ResetCompleted { unit_id, result } => Msg::ResetCompleted {
            unit_id,
            result: result.map_err(|err| err.to_string()),
        },
    }
}
