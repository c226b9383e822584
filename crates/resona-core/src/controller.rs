//! Playback lifecycle.
//!
//! [`PlaybackController`] owns at most one [`Session`] and moves between
//! three states:
//!
//! ```text
//!            start                 stop               timer elapsed
//!   Idle ──────────────→ Playing ──────→ StoppingFadeOut ──────────→ Idle
//!    ↑ acquire engine       fade out over                 stop, disconnect,
//!      build graph          fade_out, arm timer           close engine
//!      fade in
//! ```
//!
//! `start` is ignored outside Idle and `stop` outside Playing, so a session
//! is never built while the previous one is still fading out. Every trigger
//! takes `&mut self`; there is no re-entry while an engine is being
//! acquired.
//!
//! The teardown timer runs on an injected [`Clock`] and is checked by
//! [`poll`](PlaybackController::poll), which the front end calls
//! periodically.

use std::time::Duration;

use crate::clock::{Clock, SystemClock, Timer};
use crate::engine::{AudioEngine, EngineProvider, EngineState};
use crate::error::PlaybackError;
use crate::fade::Fade;
use crate::preset::PresetTable;
use crate::session::{self, GraphSettings, Session};

/// Externally visible controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No session. `start` is accepted.
    Idle,
    /// Tones sounding. `stop` is accepted.
    Playing,
    /// Fading out; teardown follows when the timer elapses.
    StoppingFadeOut,
}

impl LifecycleState {
    /// Whether `start` would do anything.
    pub fn can_start(self) -> bool {
        self == Self::Idle
    }

    /// Whether `stop` would do anything.
    pub fn can_stop(self) -> bool {
        self == Self::Playing
    }
}

impl core::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Playing => f.write_str("playing"),
            Self::StoppingFadeOut => f.write_str("stopping"),
        }
    }
}

/// Fade timings and graph shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    /// Linear fade from silence to full level.
    pub fade_in: Duration,
    /// Exponential fade down to `fade_floor`; teardown waits this long.
    pub fade_out: Duration,
    /// Level an exponential fade-out ends at, since it cannot reach zero.
    pub fade_floor: f32,
    /// Tone graph configuration.
    pub graph: GraphSettings,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            fade_in: Duration::from_secs(2),
            fade_out: Duration::from_secs(2),
            fade_floor: 0.001,
            graph: GraphSettings::default(),
        }
    }
}

/// Start/stop state machine for the tone ensemble.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use resona_core::{
///     LifecycleState, ManualClock, OfflineEngineProvider, PlaybackController,
///     PlaybackSettings, Preset, PresetTable,
/// };
///
/// let presets = PresetTable::from_presets([Preset::new("duo", vec![55.0, 82.5]).unwrap()]).unwrap();
/// let clock = ManualClock::new();
/// let mut controller = PlaybackController::with_clock(
///     OfflineEngineProvider::default(),
///     presets,
///     PlaybackSettings::default(),
///     clock.clone(),
/// );
///
/// controller.start("duo").unwrap();
/// assert_eq!(controller.state(), LifecycleState::Playing);
///
/// controller.stop();
/// clock.advance(Duration::from_secs(2));
/// assert_eq!(controller.poll(), LifecycleState::Idle);
/// ```
pub struct PlaybackController<P: EngineProvider, C: Clock = SystemClock> {
    provider: P,
    clock: C,
    presets: PresetTable,
    settings: PlaybackSettings,
    selected: Option<String>,
    state: LifecycleState,
    session: Option<Session<P::Engine>>,
    teardown_timer: Timer,
}

impl<P: EngineProvider> PlaybackController<P, SystemClock> {
    /// Controller on the system clock.
    pub fn new(provider: P, presets: PresetTable, settings: PlaybackSettings) -> Self {
        Self::with_clock(provider, presets, settings, SystemClock::new())
    }
}

impl<P: EngineProvider, C: Clock> PlaybackController<P, C> {
    /// Controller on an explicit clock. The first preset is selected.
    pub fn with_clock(provider: P, presets: PresetTable, settings: PlaybackSettings, clock: C) -> Self {
        let selected = presets.ids().next().map(str::to_owned);
        Self {
            provider,
            clock,
            presets,
            settings,
            selected,
            state: LifecycleState::Idle,
            session: None,
            teardown_timer: Timer::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The live session, if any.
    pub fn session(&self) -> Option<&Session<P::Engine>> {
        self.session.as_ref()
    }

    /// The live session, mutably.
    pub fn session_mut(&mut self) -> Option<&mut Session<P::Engine>> {
        self.session.as_mut()
    }

    /// Generators in the live session (0 when idle).
    pub fn generator_count(&self) -> usize {
        self.session.as_ref().map_or(0, Session::generator_count)
    }

    /// Preset used by the next [`start_selected`](Self::start_selected).
    pub fn selected_preset(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Available presets.
    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    /// Fade and graph settings.
    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// The engine provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Start playing `preset_id` and make it the selected preset.
    ///
    /// Ignored unless idle. On error the controller stays idle with no
    /// session.
    pub fn start(&mut self, preset_id: &str) -> Result<(), PlaybackError> {
        if !self.state.can_start() {
            tracing::debug!("start ignored while {}", self.state);
            return Ok(());
        }
        let preset = self
            .presets
            .get(preset_id)
            .ok_or_else(|| PlaybackError::UnknownPreset(preset_id.to_owned()))?
            .clone();
        self.selected = Some(preset.id().to_owned());

        let mut engine = self
            .provider
            .acquire()
            .map_err(PlaybackError::EngineUnavailable)?;
        if engine.state() != EngineState::Running
            && let Err(err) = engine.resume()
        {
            if let Err(close_err) = engine.close() {
                tracing::warn!("closing engine after failed resume: {close_err}");
            }
            return Err(PlaybackError::EngineUnavailable(err));
        }

        let mut session = session::build(engine, &preset, &self.settings.graph)?;

        let fader = session.fader();
        let fade = Fade::fade_in(self.settings.fade_in.as_secs_f64());
        if let Err(err) = fade.schedule(session.engine_mut(), fader) {
            log_ramp_failure("fade in", PlaybackError::RampScheduling(err));
        }

        tracing::info!(
            "playing '{}' ({} tones, fade in {:?})",
            preset.id(),
            session.generator_count(),
            self.settings.fade_in
        );
        self.session = Some(session);
        self.state = LifecycleState::Playing;
        Ok(())
    }

    /// Start the selected preset.
    pub fn start_selected(&mut self) -> Result<(), PlaybackError> {
        match self.selected.clone() {
            Some(id) => self.start(&id),
            None => Err(PlaybackError::UnknownPreset(String::new())),
        }
    }

    /// Begin the fade-out. Teardown happens on the first [`poll`](Self::poll)
    /// after the fade-out duration.
    ///
    /// Ignored unless playing.
    pub fn stop(&mut self) {
        if !self.state.can_stop() {
            tracing::debug!("stop ignored while {}", self.state);
            return;
        }
        let floor = self.settings.fade_floor;
        let fade_secs = self.settings.fade_out.as_secs_f64();

        if let Some(session) = self.session.as_mut() {
            let fader = session.fader();
            let engine = session.engine_mut();
            let current = engine.gain_value(fader).unwrap_or(floor);
            if let Err(err) = Fade::fade_out(current, floor, fade_secs).schedule(engine, fader) {
                log_ramp_failure("fade out", PlaybackError::RampScheduling(err));
            }
        }

        self.teardown_timer
            .arm(self.clock.now(), self.settings.fade_out);
        self.state = LifecycleState::StoppingFadeOut;
        tracing::info!("stopping (fade out {:?})", self.settings.fade_out);
    }

    /// Select the preset for the next start.
    ///
    /// While playing this also stops, so the switch takes effect on the next
    /// start. A fade-out already in flight is left alone.
    pub fn select_preset(&mut self, preset_id: &str) -> Result<(), PlaybackError> {
        let preset = self
            .presets
            .get(preset_id)
            .ok_or_else(|| PlaybackError::UnknownPreset(preset_id.to_owned()))?;
        self.selected = Some(preset.id().to_owned());
        if self.state == LifecycleState::Playing {
            self.stop();
        }
        Ok(())
    }

    /// Run the teardown if its timer has elapsed. Returns the state after.
    pub fn poll(&mut self) -> LifecycleState {
        if self.state == LifecycleState::StoppingFadeOut
            && self.teardown_timer.expired(self.clock.now())
        {
            self.teardown();
        }
        self.state
    }

    /// Time until the pending teardown, if one is armed.
    pub fn time_until_teardown(&self) -> Option<Duration> {
        self.teardown_timer.remaining(self.clock.now())
    }

    /// Tear down immediately, skipping any remaining fade.
    pub fn shutdown(&mut self) {
        if self.session.is_some() || self.state != LifecycleState::Idle {
            self.teardown();
        }
    }

    fn teardown(&mut self) {
        self.teardown_timer.cancel();
        if let Some(session) = self.session.take() {
            let preset = session.preset_id().to_owned();
            for failure in session.teardown() {
                tracing::warn!("teardown: {failure}: {}", source_text(&failure));
            }
            tracing::info!("stopped '{preset}'");
        }
        self.state = LifecycleState::Idle;
    }
}

impl<P: EngineProvider, C: Clock> core::fmt::Debug for PlaybackController<P, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("selected", &self.selected)
            .field("generators", &self.generator_count())
            .field("teardown_timer", &self.teardown_timer)
            .finish_non_exhaustive()
    }
}

fn log_ramp_failure(what: &str, err: PlaybackError) {
    tracing::error!("{what}: {err}: {}", source_text(&err));
}

fn source_text(err: &PlaybackError) -> String {
    std::error::Error::source(err).map_or_else(String::new, ToString::to_string)
}
