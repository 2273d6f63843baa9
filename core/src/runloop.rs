//! Frame loop driving the dispatcher
//!
//! Each frame polls the command transports, turns newly asserted binds into
//! dispatcher events, runs the core unless paused, and then does the
//! dispatcher's per-frame housekeeping.

use std::time::{Duration, Instant};

use retrocmd_shared::BindId;

use crate::command::CommandState;
use crate::event::{Dispatcher, EventCommand};

/// Frame pacing when nothing else sets it.
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Slow motion stretches every frame by this factor.
const SLOW_MOTION_FACTOR: u32 = 3;

/// Event fired when `id` goes from released to pressed.
///
/// Hold binds and menu navigation have no edge event; hold binds are read as
/// levels every frame and menu navigation belongs to the menu driver.
pub fn hotkey_event(id: BindId) -> Option<EventCommand> {
    use EventCommand as E;

    let cmd = match id {
        BindId::FastForward => E::FastForwardToggle,
        BindId::SlowMotion => E::SlowMotionToggle,
        BindId::LoadState => E::LoadState,
        BindId::SaveState => E::SaveState,
        BindId::FullscreenToggle => E::FullscreenToggle,
        BindId::CloseContent => E::CloseContent,
        BindId::Quit => E::Quit,
        BindId::StateSlotPlus => E::StateSlotIncrement,
        BindId::StateSlotMinus => E::StateSlotDecrement,
        BindId::BsvRecordToggle => E::BsvRecordingToggle,
        BindId::PauseToggle => E::PauseToggle,
        BindId::FrameAdvance => E::FrameAdvance,
        BindId::Reset => E::Reset,
        BindId::ShaderNext => E::ShaderNext,
        BindId::ShaderPrev => E::ShaderPrev,
        BindId::CheatIndexPlus => E::CheatIndexPlus,
        BindId::CheatIndexMinus => E::CheatIndexMinus,
        BindId::CheatToggle => E::CheatToggle,
        BindId::Screenshot => E::TakeScreenshot,
        BindId::Mute => E::AudioMuteToggle,
        BindId::OsdToggle => E::OsdToggle,
        BindId::NetplayFlip => E::NetplayFlipPlayers,
        BindId::NetplayGameWatch => E::NetplayGameWatch,
        BindId::NetplayHostToggle => E::NetplayHostToggle,
        BindId::VolumeUp => E::VolumeUp,
        BindId::VolumeDown => E::VolumeDown,
        BindId::OverlayNext => E::OverlayNext,
        BindId::DiskEjectToggle => E::DiskEjectToggle,
        BindId::DiskNext => E::DiskNext,
        BindId::DiskPrev => E::DiskPrev,
        BindId::GrabMouseToggle => E::GrabMouseToggle,
        BindId::GameFocusToggle => E::GameFocusToggle,
        BindId::MenuToggle => E::MenuToggle,
        BindId::RecordingToggle => E::RecordingToggle,
        BindId::StreamingToggle => E::StreamingToggle,
        BindId::UndoLoadState => E::UndoLoadState,
        BindId::UndoSaveState => E::UndoSaveState,
        BindId::FastForwardHold
        | BindId::SlowMotionHold
        | BindId::Rewind
        | BindId::MenuUp
        | BindId::MenuDown
        | BindId::MenuLeft
        | BindId::MenuRight
        | BindId::MenuA
        | BindId::MenuB => return None,
    };
    Some(cmd)
}

pub struct Runloop {
    dispatcher: Dispatcher,
    /// Binds asserted in the previous frame, for edge detection.
    previous: CommandState,
    frame_duration: Duration,
}

impl Runloop {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            previous: CommandState::default(),
            frame_duration: frame_duration(DEFAULT_FRAME_RATE),
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_duration = frame_duration(frame_rate);
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn into_dispatcher(self) -> Dispatcher {
        self.dispatcher
    }

    /// Merge this frame's bind state: holds as levels, the rest on the
    /// rising edge.
    pub fn apply_binds(&mut self, current: CommandState) {
        let rewind_ready = self.dispatcher.services_mut().rewind.is_active();
        let state = self.dispatcher.state_mut();
        state.hold_fast_forward = current.get(BindId::FastForwardHold);
        state.hold_slow_motion = current.get(BindId::SlowMotionHold);
        state.rewinding = current.get(BindId::Rewind) && rewind_ready;

        let previous = self.previous;
        for id in current.pressed().filter(|id| !previous.get(*id)) {
            if let Some(cmd) = hotkey_event(id) {
                tracing::debug!(bind = %id, ?cmd, "hotkey");
                self.dispatcher.execute(cmd);
            }
        }
        self.previous = current;
    }

    /// Run one frame. Returns false once a quit has been requested.
    pub fn run_frame(&mut self) -> bool {
        let current = self.dispatcher.poll_commands();
        self.apply_binds(current);
        if self.dispatcher.state().quit_requested {
            return false;
        }

        let paused_by_menu =
            self.dispatcher.state().menu_active && self.dispatcher.config().input.pause_on_menu;
        let state = self.dispatcher.state();
        let step = state.frame_advance;
        let running = state.core_loaded() && (step || (!state.paused && !paused_by_menu));
        if running {
            self.dispatcher.services_mut().core.run_frame();
            self.dispatcher.state_mut().frame_advance = false;
        }

        self.dispatcher.end_frame();
        !self.dispatcher.state().quit_requested
    }

    /// Run frames until quit, pacing to the configured frame rate.
    pub fn run(&mut self) {
        loop {
            let start = Instant::now();
            if !self.run_frame() {
                break;
            }
            let target = self.target_frame_time();
            if let Some(remaining) = target.checked_sub(start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
        tracing::info!(frames = self.dispatcher.state().frame_count, "run loop finished");
    }

    fn target_frame_time(&self) -> Duration {
        let state = self.dispatcher.state();
        if state.fast_forwarding() {
            Duration::ZERO
        } else if state.slow_motion_active() {
            self.frame_duration * SLOW_MOTION_FACTOR
        } else {
            self.frame_duration
        }
    }
}

fn frame_duration(frame_rate: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(frame_rate.max(1)))
}
