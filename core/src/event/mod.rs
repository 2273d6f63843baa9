//! Central event dispatcher
//!
//! Every lifecycle request in the frontend, whether it comes from a hotkey, a
//! remote command, or another operation, is an [`EventCommand`] passed to
//! [`Dispatcher::execute`]. Dispatch is total: each variant has exactly one
//! branch and returns whether it succeeded.
//!
//! Composite operations list their sub-steps as data in
//! [`EventCommand::prelude`]. The prelude runs in order before the
//! variant's own body; a failed step is logged and does not stop the rest.

mod actions;
mod disk;
mod dispatcher;
mod lifecycle;
mod shaders;
mod state;
mod subsystems;


use std::path::PathBuf;

use crate::services::{CoreType, OverrideScope};

pub use dispatcher::{Dispatcher, VOLUME_MAX_DB, VOLUME_MIN_DB, VOLUME_STEP_DB, db_to_gain};
pub use lifecycle::AUTO_SLOT;
pub use shaders::ShaderList;
pub use state::{MovieMode, RuntimeState};

/// Every operation the dispatcher knows.
#[derive(Debug, Clone, PartialEq)]
pub enum EventCommand {
    None,

    // Core and content
    LoadCore(PathBuf),
    LoadCoreDeinit,
    LoadContent(PathBuf),
    UnloadCore,
    CloseContent,
    CoreInit(CoreType),
    CoreDeinit,
    Reset,
    Quit,
    RestartFrontend,
    Shutdown,

    // Save states and save RAM
    SaveState,
    LoadState,
    UndoSaveState,
    UndoLoadState,
    StateSlotIncrement,
    StateSlotDecrement,
    SetStateSlot(i32),
    AutosaveState,
    AutosaveInit,
    AutosaveDeinit,
    SaveFiles,
    SaveFilesInit,
    SaveFilesDeinit,

    // Rewind and input movies
    RewindInit,
    RewindDeinit,
    RewindToggle,
    BsvMovieInit,
    BsvMovieDeinit,
    BsvRecordingToggle,

    // Netplay
    NetplayInit,
    NetplayInitDirect { host: String, port: u16 },
    NetplayDeinit,
    NetplayHostToggle,
    NetplayFlipPlayers,
    NetplayGameWatch,
    NetworkInit,
    NetworkDeinit,

    // Cheats
    CheatsInit,
    CheatsDeinit,
    CheatsApply,
    CheatToggle,
    CheatIndexPlus,
    CheatIndexMinus,

    // Configuration, overrides and shaders
    DisableOverrides,
    RestoreDefaultShaderPreset,
    RestoreRemaps,
    RemapsInit,
    SaveConfig,
    SaveCurrentConfig,
    SaveOverride(OverrideScope),
    ShaderDirInit,
    ShaderDirDeinit,
    ShaderNext,
    ShaderPrev,
    SetShader(PathBuf),

    // Disk control
    DiskEjectToggle,
    DiskNext,
    DiskPrev,
    DiskIndex(u32),
    DiskAppendImage(PathBuf),

    // Audio
    AudioStop,
    AudioStart,
    AudioMuteToggle,
    AudioReinit,
    VolumeUp,
    VolumeDown,
    DspFilterInit,
    DspFilterDeinit,
    AudioSetBlockingState,
    AudioSetNonblockingState,

    // Video
    Reinit,
    FullscreenToggle,
    TakeScreenshot,
    VideoSetAspectRatio,
    VideoApplyStateChanges,
    VideoSetBlockingState,
    VideoSetNonblockingState,
    OsdToggle,

    // Drivers
    DriversInit,
    DriversDeinit,
    ResetContext,

    // Input and overlay
    ControllersInit,
    GrabMouseToggle,
    GameFocusToggle,
    RumbleStop,
    OverlayInit,
    OverlayDeinit,
    OverlayNext,

    // Run loop
    PauseToggle,
    Pause,
    Unpause,
    PauseChecks,
    MenuToggle,
    FastForwardToggle,
    SlowMotionToggle,
    FrameAdvance,

    // Frontend services
    CommandInit,
    CommandDeinit,
    HistoryInit,
    HistoryDeinit,
    RecordInit,
    RecordDeinit,
    RecordingToggle,
    StreamingToggle,
    PerfcntReportFrontendLog,
    CheevosHardcoreModeToggle,
}

use EventCommand as E;

const UNLOAD_CORE_STEPS: &[EventCommand] = &[
    E::AutosaveState,
    E::DisableOverrides,
    E::RestoreDefaultShaderPreset,
    E::RestoreRemaps,
];
const CORE_DEINIT_STEPS: &[EventCommand] = &[
    E::SaveFiles,
    E::AutosaveDeinit,
    E::NetplayDeinit,
    E::BsvMovieDeinit,
    E::RewindDeinit,
    E::CheatsDeinit,
];
const RESET_CONTEXT_STEPS: &[EventCommand] = &[E::DriversDeinit, E::DriversInit];
const REINIT_STEPS: &[EventCommand] = &[E::ResetContext];
const AUTOSAVE_INIT_STEPS: &[EventCommand] = &[E::AutosaveDeinit];
const BSV_MOVIE_INIT_STEPS: &[EventCommand] = &[E::BsvMovieDeinit];
const NETPLAY_INIT_STEPS: &[EventCommand] = &[E::NetplayDeinit];
const CHEATS_INIT_STEPS: &[EventCommand] = &[E::CheatsDeinit];
const DSP_FILTER_INIT_STEPS: &[EventCommand] = &[E::DspFilterDeinit];
const OVERLAY_INIT_STEPS: &[EventCommand] = &[E::OverlayDeinit];
const COMMAND_INIT_STEPS: &[EventCommand] = &[E::CommandDeinit];
const HISTORY_INIT_STEPS: &[EventCommand] = &[E::HistoryDeinit];
const RECORD_INIT_STEPS: &[EventCommand] = &[E::RecordDeinit];
const SHADER_DIR_INIT_STEPS: &[EventCommand] = &[E::ShaderDirDeinit];

impl EventCommand {
    /// Commands executed, in order, before this command's own body.
    pub fn prelude(&self) -> &'static [EventCommand] {
        match self {
            E::UnloadCore => UNLOAD_CORE_STEPS,
            E::CoreDeinit => CORE_DEINIT_STEPS,
            E::ResetContext => RESET_CONTEXT_STEPS,
            E::Reinit => REINIT_STEPS,
            E::AutosaveInit => AUTOSAVE_INIT_STEPS,
            E::BsvMovieInit => BSV_MOVIE_INIT_STEPS,
            E::NetplayInit | E::NetplayInitDirect { .. } => NETPLAY_INIT_STEPS,
            E::CheatsInit => CHEATS_INIT_STEPS,
            E::DspFilterInit => DSP_FILTER_INIT_STEPS,
            E::OverlayInit => OVERLAY_INIT_STEPS,
            E::CommandInit => COMMAND_INIT_STEPS,
            E::HistoryInit => HISTORY_INIT_STEPS,
            E::RecordInit => RECORD_INIT_STEPS,
            E::ShaderDirInit => SHADER_DIR_INIT_STEPS,
            _ => &[],
        }
    }
}
