//! Rewind, movies, netplay, cheats, overrides, history, recording

use std::path::PathBuf;

use super::EventCommand as E;
use super::{Dispatcher, MovieMode};
use crate::config;
use crate::paths::{self, new_config_path, with_suffix};
use crate::services::OverrideScope;

impl Dispatcher {
    pub(super) fn rewind_init(&mut self) -> bool {
        if self.services.netplay.is_connected() {
            tracing::warn!("rewind is not available during netplay");
            return false;
        }
        if self.config.achievements.hardcore_mode {
            tracing::warn!("rewind is disabled in hardcore mode");
            return false;
        }
        if !self.state.content_loaded() {
            return false;
        }
        if self.services.core.serialize_size() == 0 {
            self.notify("Core does not support rewind.");
            return false;
        }

        let size = self.config.rewind.buffer_size_mb as usize * 1024 * 1024;
        if !self.services.rewind.init(size) {
            tracing::error!(size, "failed to initialize rewind buffer");
            return false;
        }
        tracing::info!(size, "rewind buffer initialized");
        true
    }

    pub(super) fn rewind_deinit(&mut self) -> bool {
        if self.services.netplay.is_connected() {
            return false;
        }
        self.services.rewind.deinit();
        self.state.rewinding = false;
        true
    }

    /// Queue a movie to start on the next `BsvMovieInit`.
    pub fn request_movie(&mut self, mode: MovieMode, path: PathBuf) {
        self.state.movie_request = match mode {
            MovieMode::Idle => None,
            mode => Some((mode, path)),
        };
    }

    pub(super) fn movie_init(&mut self) -> bool {
        let Some((mode, path)) = self.state.movie_request.take() else {
            return false;
        };
        let started = match mode {
            MovieMode::Recording => self.services.movie.start_recording(&path),
            MovieMode::Playback => self.services.movie.start_playback(&path),
            MovieMode::Idle => false,
        };
        if !started {
            tracing::error!(path = %path.display(), ?mode, "failed to start movie");
            self.notify("Failed to start movie.");
            return false;
        }

        self.state.movie = mode;
        tracing::info!(path = %path.display(), ?mode, "movie started");
        self.notify(match mode {
            MovieMode::Recording => format!("Starting movie record to \"{}\".", path.display()),
            _ => "Starting movie playback.".to_string(),
        });
        true
    }

    pub(super) fn movie_deinit(&mut self) -> bool {
        if self.state.movie_active() {
            self.services.movie.stop();
            tracing::info!(mode = ?self.state.movie, "movie stopped");
            self.state.movie = MovieMode::Idle;
        }
        true
    }

    pub(super) fn movie_record_toggle(&mut self) -> bool {
        match self.state.movie {
            MovieMode::Recording => {
                self.execute(E::BsvMovieDeinit);
                self.notify("Movie record stopped.");
                true
            }
            MovieMode::Playback => {
                tracing::warn!("cannot record during movie playback");
                false
            }
            MovieMode::Idle => {
                if !self.state.content_loaded() {
                    return false;
                }
                let dir = self.config.paths.recording_directory.clone();
                let Some(base) = self.content_base(dir.as_deref()).or_else(|| self.state_base())
                else {
                    return false;
                };
                self.request_movie(MovieMode::Recording, with_suffix(&base, ".bsv"));
                self.execute(E::BsvMovieInit)
            }
        }
    }

    pub(super) fn netplay_init(&mut self, host: Option<&str>, port: u16) -> bool {
        if !cfg!(feature = "netplay") {
            return self.unsupported("netplay");
        }
        if !self.state.content_loaded() {
            tracing::warn!("netplay needs running content");
            return false;
        }
        if !self.services.netplay.init(host, port) {
            tracing::error!(host, port, "failed to initialize netplay");
            self.notify("Failed to initialize netplay.");
            return false;
        }

        // Rewind cannot run alongside netplay
        if self.services.rewind.is_active() {
            self.services.rewind.deinit();
        }
        tracing::info!(host, port, "netplay initialized");
        self.notify(match host {
            Some(host) => format!("Connecting to netplay host {host}:{port}."),
            None => format!("Hosting netplay on port {port}."),
        });
        true
    }

    pub(super) fn netplay_deinit(&mut self) -> bool {
        if !cfg!(feature = "netplay") {
            return self.unsupported("netplay");
        }
        if self.services.netplay.is_connected() {
            tracing::info!("netplay session closed");
        }
        self.services.netplay.deinit();
        true
    }

    pub(super) fn netplay_host_toggle(&mut self) -> bool {
        if !cfg!(feature = "netplay") {
            return self.unsupported("netplay");
        }
        if self.services.netplay.is_connected() {
            self.execute(E::NetplayDeinit);
            self.notify("Netplay stopped.");
            return true;
        }
        let port = self.config.netplay.port;
        self.netplay_init(None, port)
    }

    pub(super) fn netplay_flip_players(&mut self) -> bool {
        if !cfg!(feature = "netplay") {
            return self.unsupported("netplay");
        }
        if !self.services.netplay.is_connected() || !self.services.netplay.flip_players() {
            return false;
        }
        self.notify("Netplay players flipped.");
        true
    }

    pub(super) fn netplay_game_watch(&mut self) -> bool {
        if !cfg!(feature = "netplay") {
            return self.unsupported("netplay");
        }
        self.services.netplay.is_connected() && self.services.netplay.game_watch()
    }

    fn cheats_allowed(&self) -> bool {
        !self.config.achievements.hardcore_mode
            && !self.services.netplay.is_connected()
            && self.state.movie != MovieMode::Playback
    }

    pub(super) fn cheats_init(&mut self) -> bool {
        if !self.state.content_loaded() {
            return false;
        }
        if !self.cheats_allowed() {
            tracing::warn!("cheats are not allowed right now");
            return false;
        }
        self.state.cheat_index = 0;
        self.services.cheats.load()
    }

    pub(super) fn cheats_apply(&mut self) -> bool {
        if !self.cheats_allowed() {
            return false;
        }
        self.services.cheats.apply()
    }

    pub(super) fn cheat_toggle(&mut self) -> bool {
        if !self.cheats_allowed() {
            tracing::warn!("cheats are not allowed right now");
            return false;
        }
        let count = self.services.cheats.count();
        if count == 0 {
            return false;
        }
        let index = self.state.cheat_index.min(count - 1);
        let Some(enabled) = self.services.cheats.toggle(index) else {
            return false;
        };
        tracing::info!(index, enabled, "cheat toggled");
        self.notify(format!(
            "Cheat #{index} {}.",
            if enabled { "enabled" } else { "disabled" }
        ));
        self.execute(E::CheatsApply);
        true
    }

    pub(super) fn cheat_index_step(&mut self, forward: bool) -> bool {
        let count = self.services.cheats.count();
        if count == 0 {
            return false;
        }
        let current = self.state.cheat_index.min(count - 1);
        self.state.cheat_index = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        self.notify(format!("Cheat index: {}", self.state.cheat_index));
        true
    }

    pub(super) fn disable_overrides(&mut self) -> bool {
        if !self.state.overrides_active {
            return false;
        }
        self.state.overrides_active = false;
        let ok = self.services.overrides.unload_override();
        if ok {
            tracing::info!("configuration override removed");
        } else {
            tracing::error!("failed to remove configuration override");
        }
        ok
    }

    /// Run `save` with any active override temporarily removed.
    fn with_overrides_suspended<T>(&mut self, save: impl FnOnce(&mut Self) -> T) -> T {
        let suspended = self.state.overrides_active && self.services.overrides.unload_override();
        let result = save(self);
        if suspended && !self.services.overrides.load_override() {
            tracing::warn!("failed to reapply configuration override");
            self.state.overrides_active = false;
        }
        result
    }

    pub(super) fn save_new_config(&mut self) -> bool {
        let dir = self
            .config
            .paths
            .config_directory
            .clone()
            .or_else(|| self.config_path.as_ref()?.parent().map(PathBuf::from))
            .or_else(config::config_dir);
        let Some(dir) = dir else {
            tracing::error!("no config directory available");
            return false;
        };
        let core_name = self
            .state
            .core_path
            .as_ref()
            .and_then(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "retrocmd".to_string());
        let path = new_config_path(&dir, &core_name);

        match self.with_overrides_suspended(|this| this.config.save_to(&path)) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "config saved");
                self.notify(format!("Config saved to \"{}\".", path.display()));
                true
            }
            Err(e) => {
                tracing::error!("{e}");
                self.notify("Failed to save config.");
                false
            }
        }
    }

    pub(super) fn save_current_config(&mut self) -> bool {
        let Some(path) = self.config_path.clone() else {
            tracing::warn!("no config file to save to");
            return false;
        };
        match self.with_overrides_suspended(|this| this.config.save_to(&path)) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "config saved");
                true
            }
            Err(e) => {
                tracing::error!("{e}");
                self.notify("Failed to save config.");
                false
            }
        }
    }

    pub(super) fn save_override(&mut self, scope: OverrideScope) -> bool {
        if !self.state.core_loaded() {
            return false;
        }
        if self.services.overrides.save_override(scope) {
            tracing::info!(?scope, "override saved");
            self.notify("Overrides saved successfully.");
            true
        } else {
            tracing::error!(?scope, "failed to save override");
            self.notify("Error saving overrides.");
            false
        }
    }

    pub(super) fn history_init(&mut self) -> bool {
        if !self.config.history.enable {
            return false;
        }
        let path = self
            .config
            .history
            .path
            .clone()
            .or_else(|| config::config_dir().map(|dir| dir.join("history.lpl")));
        let Some(path) = path else {
            return false;
        };
        self.state.history_loaded = self.services.history.load(&path, self.config.history.size);
        if !self.state.history_loaded {
            tracing::error!(path = %path.display(), "failed to load history playlist");
        }
        self.state.history_loaded
    }

    pub(super) fn history_deinit(&mut self) -> bool {
        if self.state.history_loaded {
            if !self.services.history.write() {
                tracing::error!("failed to write history playlist");
            }
            self.services.history.free();
            self.state.history_loaded = false;
        }
        true
    }

    pub(super) fn push_history(&mut self) {
        if !self.state.history_loaded {
            return;
        }
        if let Some(info) = self.services.core.content() {
            if !self.services.history.push(&info) {
                tracing::warn!(content = %info.name, "failed to add history entry");
            }
        }
    }

    pub(super) fn record_start(&mut self, streaming: bool) -> bool {
        if !cfg!(feature = "recording") {
            return self.unsupported("recording");
        }
        if !self.state.core_loaded() {
            self.notify("Cannot record without a running core.");
            return false;
        }
        let dir = match paths::output_dir(
            self.config.paths.recording_directory.as_deref(),
            "recordings",
        ) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!("{e:#}");
                return false;
            }
        };
        let name = self.content_name().unwrap_or_else(|| "retrocmd".to_string());
        let suffix = if streaming { "stream" } else { "recording" };
        let path = dir.join(paths::timestamped_filename(&name, suffix, "mkv"));

        if !self.services.recorder.start(&path, streaming) {
            tracing::error!(path = %path.display(), streaming, "failed to start recording");
            self.notify("Failed to start recording.");
            return false;
        }
        if streaming {
            self.state.streaming = true;
        } else {
            self.state.recording = true;
        }
        tracing::info!(path = %path.display(), streaming, "recording started");
        self.notify(if streaming {
            "Streaming started."
        } else {
            "Recording started."
        });
        true
    }

    pub(super) fn record_stop(&mut self) -> bool {
        if !cfg!(feature = "recording") {
            return self.unsupported("recording");
        }
        if !self.state.recording && !self.state.streaming {
            return true;
        }
        let ok = self.services.recorder.stop();
        self.state.recording = false;
        self.state.streaming = false;
        tracing::info!("recording stopped");
        self.notify("Recording stopped.");
        ok
    }

    pub(super) fn take_screenshot(&mut self) -> bool {
        if !self.state.core_loaded() {
            return false;
        }
        let dir = match paths::output_dir(
            self.config.video.screenshot_directory.as_deref(),
            "screenshots",
        ) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!("{e:#}");
                return false;
            }
        };
        let name = self.content_name().unwrap_or_else(|| "retrocmd".to_string());
        let path = dir.join(paths::timestamped_filename(&name, "screenshot", "png"));

        if !self.services.video.screenshot(&path) {
            tracing::error!(path = %path.display(), "failed to take screenshot");
            self.notify("Failed to take screenshot.");
            return false;
        }
        tracing::info!(path = %path.display(), "screenshot saved");
        self.notify("Screenshot saved.");
        true
    }

    pub(super) fn hardcore_toggle(&mut self) -> bool {
        let enable = !self.config.achievements.hardcore_mode;
        self.config.achievements.hardcore_mode = enable;
        tracing::info!(enable, "hardcore mode toggled");

        if enable {
            self.execute(E::RewindDeinit);
            self.execute(E::CheatsDeinit);
            if self.state.movie_active() {
                self.execute(E::BsvMovieDeinit);
            }
            if self.state.content_loaded() {
                self.execute(E::Reset);
            }
            self.notify("Hardcore mode enabled.");
        } else {
            self.notify("Hardcore mode disabled.");
        }
        true
    }
}
