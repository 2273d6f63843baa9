//! The dispatcher and its exhaustive command match

use std::path::PathBuf;
use std::time::Instant;

use crate::command::{CommandInterface, CommandState};
use crate::config::Config;
use crate::message_queue::{DEFAULT_DURATION, MessageQueue};
use crate::services::Services;

use super::shaders::ShaderList;
use super::state::RuntimeState;
use super::EventCommand as E;
use super::EventCommand;

/// Volume change per `VolumeUp`/`VolumeDown`, in dB.
pub const VOLUME_STEP_DB: f32 = 0.5;
pub const VOLUME_MIN_DB: f32 = -80.0;
pub const VOLUME_MAX_DB: f32 = 12.0;

/// Convert a dB volume to a linear gain.
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Owns the frontend's runtime state and coordinates every subsystem.
pub struct Dispatcher {
    pub(super) config: Config,
    pub(super) config_path: Option<PathBuf>,
    pub(super) services: Services,
    pub(super) state: RuntimeState,
    pub(super) messages: MessageQueue,
    pub(super) command: Option<CommandInterface>,
    /// Bumped whenever the command interface is replaced or removed.
    pub(super) command_generation: u64,
    pub(super) shaders: ShaderList,
    pub(super) version: String,
}

impl Dispatcher {
    pub fn new(config: Config, services: Services) -> Self {
        Self {
            config,
            config_path: None,
            services,
            state: RuntimeState::default(),
            messages: MessageQueue::default(),
            command: None,
            command_generation: 0,
            shaders: ShaderList::default(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// File that `SaveCurrentConfig` writes to.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Version string reported by `VERSION`.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RuntimeState {
        &mut self.state
    }

    pub fn messages(&self) -> &MessageQueue {
        &self.messages
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn command_interface(&self) -> Option<&CommandInterface> {
        self.command.as_ref()
    }

    /// Install an already opened command interface, replacing any other.
    pub fn install_command_interface(&mut self, command: CommandInterface) {
        self.command = Some(command);
        self.command_generation += 1;
    }

    /// Push a standard on-screen message.
    pub fn notify(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(message = %text, "notification");
        self.messages.push(text, 1, DEFAULT_DURATION);
    }

    pub(super) fn unsupported(&self, feature: &str) -> bool {
        tracing::debug!(feature, "not available in this build");
        false
    }

    /// Poll the command transports and return this window's bind state.
    ///
    /// Actions received during the poll run against this dispatcher.
    pub fn poll_commands(&mut self) -> CommandState {
        let Some(mut command) = self.command.take() else {
            return CommandState::default();
        };
        let generation = self.command_generation;
        command.poll(self);
        let state = *command.state();
        // An action may have reinitialized or shut down the interface
        if self.command_generation == generation {
            self.command = Some(command);
        }
        state
    }

    /// Per-frame housekeeping after the core has run.
    pub fn end_frame(&mut self) {
        self.state.frame_count += 1;
        self.messages.tick();

        if self.state.autosave_active {
            let interval = u64::from(self.config.savestate.autosave_interval);
            let due = self
                .state
                .autosave_last
                .is_none_or(|last| last.elapsed().as_secs() >= interval);
            if due {
                self.execute(E::SaveFiles);
                self.state.autosave_last = Some(Instant::now());
            }
        }
    }

    /// Run `cmd`: its prelude steps in order, then its own body.
    pub fn execute(&mut self, cmd: EventCommand) -> bool {
        self.state.events_dispatched += 1;
        tracing::trace!(command = ?cmd, "dispatch");

        for step in cmd.prelude() {
            if !self.execute(step.clone()) {
                tracing::debug!(?step, parent = ?cmd, "composite step did not complete");
            }
        }
        self.run(cmd)
    }

    fn run(&mut self, cmd: EventCommand) -> bool {
        match cmd {
            E::None => false,

            E::LoadCore(path) => self.load_core(path),
            E::LoadCoreDeinit => {
                self.state.core_path = None;
                true
            }
            E::LoadContent(path) => self.load_content(path),
            E::UnloadCore => self.unload_core(),
            E::CloseContent => self.close_content(),
            E::CoreInit(core_type) => self.core_init(core_type),
            E::CoreDeinit => self.core_deinit(),
            E::Reset => self.reset(),
            E::Quit => {
                tracing::info!("quit requested");
                self.state.quit_requested = true;
                true
            }
            E::RestartFrontend => {
                self.state.restart_requested = true;
                self.execute(E::Quit)
            }
            E::Shutdown => {
                self.notify("Shutting down...");
                self.state.shutdown_requested = true;
                self.execute(E::Quit)
            }

            E::SaveState => self.save_state(),
            E::LoadState => self.load_state(),
            E::UndoSaveState => self.undo_save_state(),
            E::UndoLoadState => self.undo_load_state(),
            E::StateSlotIncrement => self.set_state_slot(self.config.savestate.slot.saturating_add(1)),
            E::StateSlotDecrement => {
                let slot = self.config.savestate.slot;
                if slot <= -1 {
                    return false;
                }
                self.set_state_slot(slot - 1)
            }
            E::SetStateSlot(slot) => self.set_state_slot(slot),
            E::AutosaveState => self.autosave_state(),
            E::AutosaveInit => self.autosave_init(),
            E::AutosaveDeinit => {
                self.state.autosave_active = false;
                self.state.autosave_last = None;
                true
            }
            E::SaveFiles => self.save_files(),
            E::SaveFilesInit => self.save_files_init(),
            E::SaveFilesDeinit => {
                self.state.sram_in_use = false;
                true
            }

            E::RewindInit => self.rewind_init(),
            E::RewindDeinit => self.rewind_deinit(),
            E::RewindToggle => {
                if self.config.rewind.enable {
                    self.execute(E::RewindInit)
                } else {
                    self.execute(E::RewindDeinit)
                }
            }
            E::BsvMovieInit => self.movie_init(),
            E::BsvMovieDeinit => self.movie_deinit(),
            E::BsvRecordingToggle => self.movie_record_toggle(),

            E::NetplayInit => {
                let host = self.config.netplay.host.clone();
                let port = self.config.netplay.port;
                self.netplay_init(host.as_deref(), port)
            }
            E::NetplayInitDirect { host, port } => self.netplay_init(Some(&host), port),
            E::NetplayDeinit => self.netplay_deinit(),
            E::NetplayHostToggle => self.netplay_host_toggle(),
            E::NetplayFlipPlayers => self.netplay_flip_players(),
            E::NetplayGameWatch => self.netplay_game_watch(),
            E::NetworkInit => {
                self.state.network_active = true;
                true
            }
            E::NetworkDeinit => {
                self.state.network_active = false;
                true
            }

            E::CheatsInit => self.cheats_init(),
            E::CheatsDeinit => {
                self.services.cheats.free();
                self.state.cheat_index = 0;
                true
            }
            E::CheatsApply => self.cheats_apply(),
            E::CheatToggle => self.cheat_toggle(),
            E::CheatIndexPlus => self.cheat_index_step(true),
            E::CheatIndexMinus => self.cheat_index_step(false),

            E::DisableOverrides => self.disable_overrides(),
            E::RestoreDefaultShaderPreset => self.restore_default_shader(),
            E::RestoreRemaps => {
                if !self.state.remaps_active {
                    return false;
                }
                self.services.overrides.unload_remap();
                self.state.remaps_active = false;
                true
            }
            E::RemapsInit => {
                if !self.config.input.auto_remaps_enable {
                    return false;
                }
                self.state.remaps_active = self.services.overrides.load_remap();
                self.state.remaps_active
            }
            E::SaveConfig => self.save_new_config(),
            E::SaveCurrentConfig => self.save_current_config(),
            E::SaveOverride(scope) => self.save_override(scope),
            E::ShaderDirInit => self.shader_dir_init(),
            E::ShaderDirDeinit => {
                self.shaders.clear();
                true
            }
            E::ShaderNext => self.shader_cycle(true),
            E::ShaderPrev => self.shader_cycle(false),
            E::SetShader(preset) => self.set_shader(preset),

            E::DiskEjectToggle => self.disk_eject_toggle(),
            E::DiskNext => self.disk_step(1),
            E::DiskPrev => self.disk_step(-1),
            E::DiskIndex(index) => self.disk_set_index(index),
            E::DiskAppendImage(path) => self.disk_append_image(&path),

            E::AudioStop => {
                if !self.services.audio.is_alive() {
                    return false;
                }
                self.services.audio.stop()
            }
            E::AudioStart => self.audio_start(),
            E::AudioMuteToggle => self.audio_mute_toggle(),
            E::AudioReinit => {
                self.services.audio.deinit();
                if !self.services.audio.init() {
                    tracing::error!("failed to reinitialize audio driver");
                    return false;
                }
                self.apply_audio_settings();
                self.execute(E::AudioStart)
            }
            E::VolumeUp => self.adjust_volume(VOLUME_STEP_DB),
            E::VolumeDown => self.adjust_volume(-VOLUME_STEP_DB),
            E::DspFilterInit => {
                let Some(plugin) = self.config.audio.dsp_plugin.clone() else {
                    return false;
                };
                self.state.dsp_active = self.services.audio.dsp_filter_init(&plugin);
                if !self.state.dsp_active {
                    tracing::error!(plugin = %plugin.display(), "failed to load DSP filter");
                }
                self.state.dsp_active
            }
            E::DspFilterDeinit => {
                if self.state.dsp_active {
                    self.services.audio.dsp_filter_deinit();
                    self.state.dsp_active = false;
                }
                true
            }
            E::AudioSetBlockingState => {
                self.services.audio.set_nonblocking(false);
                true
            }
            E::AudioSetNonblockingState => {
                self.services.audio.set_nonblocking(true);
                true
            }

            E::Reinit => {
                self.services.input.poll();
                if self.state.menu_active {
                    self.execute(E::VideoSetBlockingState);
                }
                self.state.drivers_active
            }
            E::FullscreenToggle => {
                if !self.services.video.has_windowed() {
                    return false;
                }
                self.config.video.fullscreen = !self.config.video.fullscreen;
                tracing::info!(fullscreen = self.config.video.fullscreen, "fullscreen toggled");
                self.execute(E::Reinit)
            }
            E::TakeScreenshot => self.take_screenshot(),
            E::VideoSetAspectRatio => {
                self.services.video.set_aspect_ratio();
                true
            }
            E::VideoApplyStateChanges => {
                self.services.video.apply_state_changes();
                true
            }
            E::VideoSetBlockingState => {
                self.services.video.set_nonblocking(false);
                true
            }
            E::VideoSetNonblockingState => {
                self.services.video.set_nonblocking(true);
                true
            }
            E::OsdToggle => {
                self.config.video.fps_show = !self.config.video.fps_show;
                tracing::info!(visible = self.config.video.fps_show, "frame counter toggled");
                true
            }

            E::DriversInit => self.drivers_init(),
            E::DriversDeinit => {
                if self.state.overlay_loaded {
                    self.execute(E::OverlayDeinit);
                }
                self.services.input.deinit();
                self.services.audio.deinit();
                self.services.video.deinit();
                self.state.drivers_active = false;
                true
            }
            E::ResetContext => self.state.drivers_active,

            E::ControllersInit => {
                if !self.state.core_loaded() {
                    return false;
                }
                for port in 0..self.config.input.max_users {
                    let device = self.config.input.device(port);
                    self.services.core.set_controller_port_device(port, device);
                }
                true
            }
            E::GrabMouseToggle => {
                let grab = !self.state.mouse_grabbed;
                self.set_mouse_grab(grab)
            }
            E::GameFocusToggle => {
                let focused = !self.state.game_focus;
                self.services.input.set_game_focus(focused);
                self.state.game_focus = focused;
                self.set_mouse_grab(focused);
                self.notify(if focused {
                    "Game focus on."
                } else {
                    "Game focus off."
                });
                true
            }
            E::RumbleStop => {
                for port in 0..self.config.input.max_users {
                    self.services.input.set_rumble(port, 0, 0);
                }
                true
            }
            E::OverlayInit => self.overlay_init(),
            E::OverlayDeinit => {
                if !cfg!(feature = "overlay") {
                    return self.unsupported("overlay");
                }
                if self.state.overlay_loaded {
                    self.services.input.overlay_unload();
                    self.state.overlay_loaded = false;
                }
                true
            }
            E::OverlayNext => {
                if !cfg!(feature = "overlay") {
                    return self.unsupported("overlay");
                }
                self.state.overlay_loaded && self.services.input.overlay_next()
            }

            E::PauseToggle => {
                self.state.paused = !self.state.paused;
                self.execute(E::PauseChecks)
            }
            E::Pause => {
                self.state.paused = true;
                self.execute(E::PauseChecks)
            }
            E::Unpause => {
                self.state.paused = false;
                self.execute(E::PauseChecks)
            }
            E::PauseChecks => {
                if self.state.paused {
                    tracing::info!("paused");
                    self.notify("Paused.");
                    self.execute(E::AudioStop);
                } else if !self.state.menu_active {
                    tracing::info!("unpaused");
                    self.execute(E::AudioStart);
                }
                true
            }
            E::MenuToggle => {
                self.state.menu_active = !self.state.menu_active;
                tracing::debug!(menu = self.state.menu_active, "menu toggled");
                if self.state.menu_active {
                    if self.config.input.pause_on_menu {
                        self.execute(E::AudioStop);
                    }
                } else if !self.state.paused {
                    self.execute(E::AudioStart);
                }
                true
            }
            E::FastForwardToggle => {
                self.state.fast_forward = !self.state.fast_forward;
                let enabled = self.state.fast_forward;
                self.services.audio.set_nonblocking(enabled);
                self.services.video.set_nonblocking(enabled);
                self.notify(if enabled {
                    "Fast forward."
                } else {
                    "Fast forward off."
                });
                true
            }
            E::SlowMotionToggle => {
                self.state.slow_motion = !self.state.slow_motion;
                self.notify(if self.state.slow_motion {
                    "Slow motion."
                } else {
                    "Slow motion off."
                });
                true
            }
            E::FrameAdvance => {
                if !self.state.core_loaded() {
                    return false;
                }
                self.state.frame_advance = true;
                if !self.state.paused {
                    self.state.paused = true;
                    self.execute(E::PauseChecks);
                }
                true
            }

            E::CommandInit => self.command_init(),
            E::CommandDeinit => {
                // Also bumped mid-poll, when the interface is checked out
                self.command_generation += 1;
                if self.command.take().is_some() {
                    tracing::info!("command interface closed");
                }
                true
            }
            E::HistoryInit => self.history_init(),
            E::HistoryDeinit => self.history_deinit(),
            E::RecordInit => self.record_start(false),
            E::RecordDeinit => self.record_stop(),
            E::RecordingToggle => {
                if self.state.recording {
                    self.execute(E::RecordDeinit)
                } else {
                    self.execute(E::RecordInit)
                }
            }
            E::StreamingToggle => {
                if self.state.streaming {
                    self.execute(E::RecordDeinit)
                } else {
                    self.execute(E::RecordDeinit);
                    self.record_start(true)
                }
            }
            E::PerfcntReportFrontendLog => {
                tracing::info!(
                    frames = self.state.frame_count,
                    events = self.state.events_dispatched,
                    messages = self.messages.len(),
                    "performance counters"
                );
                true
            }
            E::CheevosHardcoreModeToggle => self.hardcore_toggle(),
        }
    }

    fn drivers_init(&mut self) -> bool {
        let video = self.services.video.init();
        if !video {
            tracing::error!("failed to initialize video driver");
        }
        self.services.video.set_fullscreen(self.config.video.fullscreen);

        if self.config.audio.enable {
            if self.services.audio.init() {
                self.apply_audio_settings();
            } else {
                tracing::error!("failed to initialize audio driver, continuing without audio");
            }
        }

        let input = self.services.input.init();
        if !input {
            tracing::error!("failed to initialize input driver");
        }

        self.state.drivers_active = video && input;
        if self.state.drivers_active && self.config.input.overlay_enable {
            self.execute(E::OverlayInit);
        }
        self.state.drivers_active
    }

    fn apply_audio_settings(&mut self) {
        self.services
            .audio
            .set_volume_gain(db_to_gain(self.config.audio.volume_db));
        self.services.audio.set_mute(self.config.audio.mute);
    }

    fn audio_start(&mut self) -> bool {
        if !self.config.audio.enable {
            return false;
        }
        if self.services.audio.is_alive() {
            return true;
        }
        if !self.services.audio.start() {
            tracing::error!("failed to start audio, continuing without audio");
            return false;
        }
        true
    }

    fn audio_mute_toggle(&mut self) -> bool {
        let mute = !self.config.audio.mute;
        if !self.services.audio.set_mute(mute) {
            tracing::error!(mute, "failed to change audio mute state");
            return false;
        }
        self.config.audio.mute = mute;
        tracing::info!(mute, "audio mute toggled");
        self.notify(if mute { "Audio muted." } else { "Audio unmuted." });
        true
    }

    fn adjust_volume(&mut self, delta_db: f32) -> bool {
        let db = (self.config.audio.volume_db + delta_db).clamp(VOLUME_MIN_DB, VOLUME_MAX_DB);
        self.config.audio.volume_db = db;
        self.services.audio.set_volume_gain(db_to_gain(db));
        tracing::info!(volume_db = db, "volume changed");
        self.notify(format!("Volume: {db:.1} dB"));
        true
    }

    fn set_mouse_grab(&mut self, grab: bool) -> bool {
        if !self.services.input.grab_mouse(grab) {
            tracing::warn!(grab, "input driver refused mouse grab");
            return false;
        }
        self.state.mouse_grabbed = grab;
        self.services.video.show_mouse(!grab);
        tracing::info!(grab, "mouse grab changed");
        true
    }

    fn overlay_init(&mut self) -> bool {
        if !cfg!(feature = "overlay") {
            return self.unsupported("overlay");
        }
        if !self.config.input.overlay_enable {
            return false;
        }
        let Some(overlay) = self.config.input.overlay.clone() else {
            return false;
        };
        self.state.overlay_loaded = self.services.input.overlay_load(&overlay);
        if !self.state.overlay_loaded {
            tracing::error!(overlay = %overlay.display(), "failed to load overlay");
        }
        self.state.overlay_loaded
    }

    fn command_init(&mut self) -> bool {
        let settings = &self.config.command;
        if !settings.network_enable && !settings.stdin_enable {
            return false;
        }
        let command =
            CommandInterface::from_config(settings, self.services.input.grabs_stdin());
        if !command.is_active() {
            return false;
        }
        self.install_command_interface(command);
        true
    }
}
