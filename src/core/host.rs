/// Host collaborator interfaces — everything the engine drives but does not own.
///
/// Rendering, audio, scene navigation and timing live in the host. The
/// engine calls into these traits while handling an event; the host feeds
/// player input back through `Engine::handle`.

use serde::{Deserialize, Serialize};

/// Identifies one scheduled `wait`. Tokens from an ended session, or
/// superseded by a later wait, are ignored when they fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken {
    pub session: u64,
    pub sequence: u64,
}

/// One visible choice of a menu, tagged with the slot the host reports
/// back when it is picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuChoice {
    pub label: String,
    pub slot: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuPrompt {
    pub choices: Vec<MenuChoice>,
    /// The narrator spoke last, so the host may center the choice surface.
    pub narrator_context: bool,
}

pub trait Presentation {
    fn show_line(&mut self, speaker: &str, content: &str, narrator: bool);
    fn show_menu(&mut self, prompt: &MenuPrompt);
    fn hide_menu(&mut self);

    /// A line is still being revealed (typewriter effect in progress).
    fn is_revealing(&self) -> bool {
        false
    }

    fn is_skippable(&self) -> bool {
        true
    }

    /// Finish revealing the current line instantly.
    fn skip_reveal(&mut self) {}
}

/// Audio and visual effects. Missing assets are the host's problem; the
/// engine never waits on or inspects the outcome.
pub trait EffectSink {
    fn play_effect(&mut self, name: &str);
    /// `None` stops the background track.
    fn play_music(&mut self, name: Option<&str>);
    fn set_background(&mut self, name: &str);
    fn set_images(&mut self, spec: &str);
}

pub trait TransitionSink {
    fn fade_in(&mut self);
    fn fade_out(&mut self);
    fn blackout(&mut self);
    fn clear_out(&mut self);
    fn set_hud_visible(&mut self, visible: bool);
}

pub trait Navigation {
    /// Called once when the session reaches the exit sentinel.
    fn exit_to_menu(&mut self);
}

pub trait TimerService {
    /// Deliver `Event::TimerElapsed(token)` once, after `units` host time units.
    fn schedule(&mut self, units: u64, token: TimerToken);
    fn cancel(&mut self, token: TimerToken);
}

/// Everything an engine needs from its host.
pub trait Host: Presentation + EffectSink + TransitionSink + Navigation + TimerService {}

impl<T> Host for T where T: Presentation + EffectSink + TransitionSink + Navigation + TimerService {}

/// A collaborator call, as recorded by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCall {
    ShowLine {
        speaker: String,
        content: String,
        narrator: bool,
    },
    ShowMenu {
        prompt: MenuPrompt,
    },
    HideMenu,
    SkipReveal,
    PlayEffect {
        name: String,
    },
    PlayMusic {
        name: Option<String>,
    },
    SetBackground {
        name: String,
    },
    SetImages {
        spec: String,
    },
    FadeIn,
    FadeOut,
    Blackout,
    ClearOut,
    SetHudVisible {
        visible: bool,
    },
    ExitToMenu,
    ScheduleTimer {
        units: u64,
        token: TimerToken,
    },
    CancelTimer {
        token: TimerToken,
    },
}

/// A host that renders nothing and records every call in order.
///
/// Useful for headless embedding (the WASM bindings forward the recorded
/// calls to JavaScript) and for tests. Reveal state is set by the caller.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
    pub revealing: bool,
    pub skippable: bool,
    pub pending_timer: Option<TimerToken>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            skippable: true,
            ..Self::default()
        }
    }

    /// Drain the calls recorded so far.
    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    /// Contents of every line shown so far, in order.
    pub fn shown_lines(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::ShowLine { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Presentation for RecordingHost {
    fn show_line(&mut self, speaker: &str, content: &str, narrator: bool) {
        self.calls.push(HostCall::ShowLine {
            speaker: speaker.to_string(),
            content: content.to_string(),
            narrator,
        });
    }

    fn show_menu(&mut self, prompt: &MenuPrompt) {
        self.calls.push(HostCall::ShowMenu {
            prompt: prompt.clone(),
        });
    }

    fn hide_menu(&mut self) {
        self.calls.push(HostCall::HideMenu);
    }

    fn is_revealing(&self) -> bool {
        self.revealing
    }

    fn is_skippable(&self) -> bool {
        self.skippable
    }

    fn skip_reveal(&mut self) {
        self.revealing = false;
        self.calls.push(HostCall::SkipReveal);
    }
}

impl EffectSink for RecordingHost {
    fn play_effect(&mut self, name: &str) {
        self.calls.push(HostCall::PlayEffect {
            name: name.to_string(),
        });
    }

    fn play_music(&mut self, name: Option<&str>) {
        self.calls.push(HostCall::PlayMusic {
            name: name.map(str::to_string),
        });
    }

    fn set_background(&mut self, name: &str) {
        self.calls.push(HostCall::SetBackground {
            name: name.to_string(),
        });
    }

    fn set_images(&mut self, spec: &str) {
        self.calls.push(HostCall::SetImages {
            spec: spec.to_string(),
        });
    }
}

impl TransitionSink for RecordingHost {
    fn fade_in(&mut self) {
        self.calls.push(HostCall::FadeIn);
    }

    fn fade_out(&mut self) {
        self.calls.push(HostCall::FadeOut);
    }

    fn blackout(&mut self) {
        self.calls.push(HostCall::Blackout);
    }

    fn clear_out(&mut self) {
        self.calls.push(HostCall::ClearOut);
    }

    fn set_hud_visible(&mut self, visible: bool) {
        self.calls.push(HostCall::SetHudVisible { visible });
    }
}

impl Navigation for RecordingHost {
    fn exit_to_menu(&mut self) {
        self.calls.push(HostCall::ExitToMenu);
    }
}

impl TimerService for RecordingHost {
    fn schedule(&mut self, units: u64, token: TimerToken) {
        self.pending_timer = Some(token);
        self.calls.push(HostCall::ScheduleTimer { units, token });
    }

    fn cancel(&mut self, token: TimerToken) {
        if self.pending_timer == Some(token) {
            self.pending_timer = None;
        }
        self.calls.push(HostCall::CancelTimer { token });
    }
}
