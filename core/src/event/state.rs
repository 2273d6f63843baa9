//! Frontend runtime flags owned by the dispatcher

use std::path::PathBuf;
use std::time::Instant;

use crate::services::CoreType;

/// Input movie mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovieMode {
    #[default]
    Idle,
    Recording,
    Playback,
}

#[derive(Debug, Default)]
pub struct RuntimeState {
    /// Core library loaded by `LoadCore`.
    pub core_path: Option<PathBuf>,
    /// Content requested by `LoadContent`.
    pub content_path: Option<PathBuf>,
    /// Set while a core is initialized.
    pub core_type: Option<CoreType>,

    pub paused: bool,
    pub menu_active: bool,
    pub fast_forward: bool,
    pub slow_motion: bool,
    /// Level-triggered hold variants, refreshed every frame.
    pub hold_fast_forward: bool,
    pub hold_slow_motion: bool,
    pub rewinding: bool,
    /// Run exactly one frame while paused.
    pub frame_advance: bool,

    pub overrides_active: bool,
    pub remaps_active: bool,
    /// Preset applied on top of the configured default.
    pub shader_preset: Option<PathBuf>,

    pub movie: MovieMode,
    /// Movie to start on the next `BsvMovieInit`.
    pub movie_request: Option<(MovieMode, PathBuf)>,

    pub sram_in_use: bool,
    pub autosave_active: bool,
    /// Last periodic save RAM flush.
    pub autosave_last: Option<Instant>,
    pub cheat_index: usize,

    pub mouse_grabbed: bool,
    pub game_focus: bool,
    pub drivers_active: bool,
    pub network_active: bool,
    pub history_loaded: bool,
    pub overlay_loaded: bool,
    pub dsp_active: bool,
    pub recording: bool,
    pub streaming: bool,

    pub quit_requested: bool,
    pub restart_requested: bool,
    pub shutdown_requested: bool,

    pub frame_count: u64,
    pub events_dispatched: u64,
}

impl RuntimeState {
    pub fn core_loaded(&self) -> bool {
        self.core_type.is_some()
    }

    /// A regular core is running user content.
    pub fn content_loaded(&self) -> bool {
        self.core_type == Some(CoreType::Plain) && self.content_path.is_some()
    }

    pub fn movie_active(&self) -> bool {
        self.movie != MovieMode::Idle
    }

    pub fn fast_forwarding(&self) -> bool {
        self.fast_forward || self.hold_fast_forward
    }

    pub fn slow_motion_active(&self) -> bool {
        self.slow_motion || self.hold_slow_motion
    }
}
