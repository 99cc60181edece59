//! WASM bindings for dialogue-engine — drives a script from a web page.
//!
//! The page owns rendering and timers. Each event method returns a JSON
//! object describing the host calls the engine made while handling it:
//!
//! ```json
//! {
//!   "state": "AwaitingTimer",
//!   "calls": [{ "type": "schedule_timer", "units": 2, "token": { "session": 1, "sequence": 1 } }],
//!   "error": null
//! }
//! ```

use wasm_bindgen::prelude::*;

use dialogue_engine::core::config::EngineConfig;
use dialogue_engine::core::engine::{Engine, EngineError, EngineState, Event};
use dialogue_engine::core::host::{HostCall, RecordingHost, TimerToken};

// ---------------------------------------------------------------------------
// Embedded sample script — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const OLD_LIGHTHOUSE: &str = include_str!("../../scripts/old_lighthouse.txt");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct StepOutput {
    state: EngineState,
    calls: Vec<HostCall>,
    error: Option<StepError>,
}

#[derive(serde::Serialize)]
struct StepError {
    message: String,
    fatal: bool,
}

impl From<&EngineError> for StepError {
    fn from(e: &EngineError) -> Self {
        StepError {
            message: e.to_string(),
            fatal: e.is_fatal(),
        }
    }
}

// ---------------------------------------------------------------------------
// DialogueSession — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct DialogueSession {
    engine: Engine,
    host: RecordingHost,
}

#[wasm_bindgen]
impl DialogueSession {
    /// Start a session over `script`, optionally configured by a RON string.
    #[wasm_bindgen(constructor)]
    pub fn new(script: &str, config_ron: Option<String>) -> Result<DialogueSession, JsError> {
        let config = match config_ron {
            Some(src) => EngineConfig::parse_ron(&src)
                .map_err(|e| JsError::new(&format!("Config parse error: {e}")))?,
            None => EngineConfig::default(),
        };

        let engine = Engine::builder()
            .script_text(script)
            .with_config(config)
            .build()
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;

        Ok(DialogueSession {
            engine,
            host: RecordingHost::new(),
        })
    }

    /// A session over the bundled sample script.
    pub fn sample() -> Result<DialogueSession, JsError> {
        DialogueSession::new(data::OLD_LIGHTHOUSE, None)
    }

    pub fn advance(&mut self) -> Result<String, JsError> {
        self.step(Event::Advance)
    }

    /// Skip the typewriter reveal. The page reports whether a line is
    /// still revealing and whether that reveal may be cut short.
    pub fn skip(&mut self, revealing: bool, skippable: bool) -> Result<String, JsError> {
        self.host.revealing = revealing;
        self.host.skippable = skippable;
        self.step(Event::Skip)
    }

    pub fn choose(&mut self, slot: usize) -> Result<String, JsError> {
        self.step(Event::Choose(slot))
    }

    /// Deliver a timer scheduled by an earlier `schedule_timer` call.
    /// `token_json` is the `token` object from that call.
    pub fn timer_elapsed(&mut self, token_json: &str) -> Result<String, JsError> {
        let token: TimerToken = serde_json::from_str(token_json)
            .map_err(|e| JsError::new(&format!("Invalid timer token JSON: {e}")))?;
        self.step(Event::TimerElapsed(token))
    }

    /// End the session. Returns the calls made during teardown (a timer
    /// cancellation, if one was pending).
    pub fn end(&mut self) -> Result<String, JsError> {
        self.engine.end_session(&mut self.host);
        self.output(None)
    }

    /// Current engine state as a JSON string.
    pub fn state(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.engine.state())
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }
}

// Private helpers
impl DialogueSession {
    fn step(&mut self, event: Event) -> Result<String, JsError> {
        let error = self
            .engine
            .handle(event, &mut self.host)
            .err()
            .map(|e| StepError::from(&e));
        self.output(error)
    }

    fn output(&mut self, error: Option<StepError>) -> Result<String, JsError> {
        let output = StepOutput {
            state: self.engine.state(),
            calls: self.host.take_calls(),
            error,
        };
        serde_json::to_string(&output)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }
}
