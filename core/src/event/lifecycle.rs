//! Core, content, save state and save RAM lifecycle

use std::path::{Path, PathBuf};
use std::time::Instant;

use super::EventCommand as E;
use super::Dispatcher;
use crate::paths::{state_path, with_suffix};
use crate::services::CoreType;

/// The auto save state slot.
pub const AUTO_SLOT: i32 = -1;

impl Dispatcher {
    pub(super) fn load_core(&mut self, path: PathBuf) -> bool {
        if !self.services.core.load(&path) {
            tracing::error!(path = %path.display(), "failed to load core");
            self.notify("Failed to load core.");
            return false;
        }
        tracing::info!(path = %path.display(), "core loaded");
        self.state.core_path = Some(path);
        true
    }

    pub(super) fn load_content(&mut self, path: PathBuf) -> bool {
        if self.state.core_path.is_none() {
            tracing::warn!(path = %path.display(), "no core loaded, cannot load content");
            self.notify("No core loaded.");
            return false;
        }
        if self.state.core_loaded() {
            self.execute(E::UnloadCore);
        }

        self.state.content_path = Some(path);
        let ok = self.execute(E::CoreInit(CoreType::Plain));
        if !ok {
            self.state.content_path = None;
        }
        ok
    }

    pub(super) fn core_init(&mut self, core_type: CoreType) -> bool {
        let content = match core_type {
            CoreType::Plain => match self.state.content_path.clone() {
                Some(content) => Some(content),
                None => {
                    tracing::warn!("core init without content");
                    return false;
                }
            },
            CoreType::Dummy | CoreType::NoContent => None,
        };

        if core_type == CoreType::Plain {
            if self.config.core.auto_overrides_enable && self.services.overrides.load_override() {
                tracing::info!("configuration override applied");
                self.state.overrides_active = true;
            }
            self.execute(E::RemapsInit);
        }

        if !self.services.core.init(core_type, content.as_deref()) {
            tracing::error!(?core_type, "failed to initialize core");
            self.notify("Failed to load content.");
            self.execute(E::DisableOverrides);
            self.execute(E::RestoreRemaps);
            return false;
        }

        self.state.core_type = Some(core_type);
        tracing::info!(?core_type, "core initialized");
        self.execute(E::ControllersInit);

        if core_type == CoreType::Plain {
            self.execute(E::SaveFilesInit);
            if self.config.savestate.auto_index {
                self.scan_state_slot();
            }
            if self.config.savestate.auto_load {
                self.autoload_state();
            }
            self.execute(E::CheatsInit);
            self.execute(E::BsvMovieInit);
            if self.config.rewind.enable {
                self.execute(E::RewindInit);
            }
            self.push_history();
        }
        true
    }

    pub(super) fn core_deinit(&mut self) -> bool {
        if !self.state.core_loaded() {
            return false;
        }
        self.services.core.unload();
        self.state.core_type = None;
        self.state.frame_advance = false;
        self.state.sram_in_use = false;
        self.execute(E::DisableOverrides);
        tracing::info!("core deinitialized");
        true
    }

    /// Body of `UnloadCore`; the prelude has already saved and restored
    /// settings.
    pub(super) fn unload_core(&mut self) -> bool {
        let ok = self.execute(E::CoreDeinit);
        self.state.content_path = None;
        ok
    }

    pub(super) fn close_content(&mut self) -> bool {
        if !self.state.content_loaded() {
            tracing::debug!("close content with nothing loaded");
            return false;
        }
        let ok = self.execute(E::UnloadCore);
        self.execute(E::CoreInit(CoreType::Dummy));
        self.notify("Content closed.");
        ok
    }

    pub(super) fn reset(&mut self) -> bool {
        if !self.state.core_loaded() {
            return false;
        }
        self.services.core.reset();
        tracing::info!("core reset");
        self.notify("Reset.");
        self.execute(E::ControllersInit);
        true
    }

    /// Display name of the running content.
    pub(super) fn content_name(&self) -> Option<String> {
        if let Some(info) = self.services.core.content() {
            return Some(info.name);
        }
        let stem = self.state.content_path.as_ref()?.file_stem()?;
        Some(stem.to_string_lossy().into_owned())
    }

    /// `<dir>/<content name>`, with `dir` defaulting to the content directory.
    pub(super) fn content_base(&self, dir: Option<&Path>) -> Option<PathBuf> {
        let name = self.content_name()?;
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => self.state.content_path.as_ref()?.parent()?.to_path_buf(),
        };
        Some(dir.join(name))
    }

    pub(super) fn state_base(&self) -> Option<PathBuf> {
        self.content_base(self.config.savestate.directory.as_deref())
    }

    fn sram_path(&self) -> Option<PathBuf> {
        self.content_base(self.config.savestate.savefile_directory.as_deref())
            .map(|base| with_suffix(&base, ".srm"))
    }

    /// Why loading a state is currently not allowed.
    pub(super) fn load_refusal(&self) -> Option<&'static str> {
        use super::MovieMode;

        match self.state.movie {
            MovieMode::Recording => return Some("cannot load states while recording a movie"),
            MovieMode::Playback => return Some("cannot load states during movie playback"),
            MovieMode::Idle => {}
        }
        if self.config.achievements.hardcore_mode {
            return Some("hardcore mode is active");
        }
        if self.services.netplay.is_connected() {
            return Some("cannot load states during netplay");
        }
        None
    }

    fn states_supported(&mut self) -> bool {
        if !self.state.content_loaded() {
            tracing::debug!("no content loaded");
            return false;
        }
        if self.services.core.serialize_size() == 0 {
            tracing::warn!("core does not support save states");
            self.notify("Core does not support save states.");
            return false;
        }
        true
    }

    pub(super) fn save_state(&mut self) -> bool {
        if !self.states_supported() {
            return false;
        }
        if self.config.savestate.auto_index {
            self.config.savestate.slot = self.config.savestate.slot.saturating_add(1);
        }
        self.save_state_to_slot(self.config.savestate.slot)
    }

    pub(super) fn save_state_to_slot(&mut self, slot: i32) -> bool {
        let Some(base) = self.state_base() else {
            return false;
        };
        let path = state_path(&base, slot);
        if !self.services.states.save(&path) {
            tracing::error!(path = %path.display(), "failed to save state");
            self.notify(format!("Failed to save state to \"{}\".", path.display()));
            return false;
        }
        tracing::info!(path = %path.display(), slot, "state saved");
        self.notify(format!("Saved state to slot #{}.", slot_label(slot)));
        true
    }

    pub(super) fn load_state(&mut self) -> bool {
        if let Some(reason) = self.load_refusal() {
            tracing::warn!("load state refused: {reason}");
            return false;
        }
        if !self.states_supported() {
            return false;
        }
        let Some(base) = self.state_base() else {
            return false;
        };
        let slot = self.config.savestate.slot;
        let path = state_path(&base, slot);
        if !self.services.states.load(&path) {
            tracing::error!(path = %path.display(), "failed to load state");
            self.notify(format!("Failed to load state from \"{}\".", path.display()));
            return false;
        }
        tracing::info!(path = %path.display(), slot, "state loaded");
        self.notify(format!("Loaded state from slot #{}.", slot_label(slot)));
        true
    }

    pub(super) fn undo_save_state(&mut self) -> bool {
        if !self.states_supported() {
            return false;
        }
        if !self.services.states.undo_save() {
            tracing::error!("failed to undo save state");
            self.notify("Failed to undo save state.");
            return false;
        }
        self.notify("Restored save state.");
        true
    }

    pub(super) fn undo_load_state(&mut self) -> bool {
        if let Some(reason) = self.load_refusal() {
            tracing::warn!("undo load state refused: {reason}");
            return false;
        }
        if !self.states_supported() {
            return false;
        }
        if !self.services.states.undo_load() {
            tracing::error!("failed to undo load state");
            self.notify("Failed to undo load state.");
            return false;
        }
        self.notify("Undid load state.");
        true
    }

    pub(super) fn set_state_slot(&mut self, slot: i32) -> bool {
        if slot < AUTO_SLOT {
            tracing::warn!(slot, "invalid state slot");
            return false;
        }
        self.config.savestate.slot = slot;
        tracing::debug!(slot, "state slot changed");
        self.notify(format!("State slot: {}", slot_label(slot)));
        true
    }

    /// Continue numbering after the highest existing slot for this content.
    fn scan_state_slot(&mut self) {
        let Some(base) = self.state_base() else {
            return;
        };
        let (Some(dir), Some(name)) = (base.parent(), base.file_name()) else {
            return;
        };
        let prefix = format!("{}.state", name.to_string_lossy());
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        let highest = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()?
                    .strip_prefix(prefix.as_str())?
                    .parse::<i32>()
                    .ok()
            })
            .max();
        if let Some(slot) = highest {
            tracing::debug!(slot, "resuming state slot numbering");
            self.config.savestate.slot = slot;
        }
    }

    fn autoload_state(&mut self) {
        let Some(base) = self.state_base() else {
            return;
        };
        let path = state_path(&base, AUTO_SLOT);
        if !path.exists() {
            return;
        }
        if self.services.states.load(&path) {
            tracing::info!(path = %path.display(), "auto save state loaded");
            self.notify("Auto-loaded save state.");
        } else {
            tracing::error!(path = %path.display(), "failed to load auto save state");
        }
    }

    pub(super) fn autosave_state(&mut self) -> bool {
        if !self.config.savestate.auto_save || !self.state.content_loaded() {
            return false;
        }
        if self.services.core.serialize_size() == 0 {
            return false;
        }
        let Some(base) = self.state_base() else {
            return false;
        };
        let path = state_path(&base, AUTO_SLOT);
        if !self.services.states.save(&path) {
            tracing::error!(path = %path.display(), "failed to write auto save state");
            return false;
        }
        tracing::info!(path = %path.display(), "auto save state written");
        true
    }

    pub(super) fn autosave_init(&mut self) -> bool {
        let interval = self.config.savestate.autosave_interval;
        if interval == 0 || !self.state.sram_in_use {
            return false;
        }
        self.state.autosave_active = true;
        self.state.autosave_last = Some(Instant::now());
        tracing::debug!(interval, "save RAM autosave armed");
        true
    }

    pub(super) fn save_files(&mut self) -> bool {
        if !self.state.sram_in_use {
            return false;
        }
        let Some(path) = self.sram_path() else {
            return false;
        };
        if !self.services.states.save_ram(&path) {
            tracing::error!(path = %path.display(), "failed to write save RAM");
            return false;
        }
        tracing::debug!(path = %path.display(), "save RAM written");
        true
    }

    pub(super) fn save_files_init(&mut self) -> bool {
        self.state.sram_in_use =
            self.state.content_loaded() && !self.config.savestate.sram_save_disable;
        if !self.state.sram_in_use {
            return false;
        }

        if let Some(path) = self.sram_path().filter(|path| path.exists()) {
            if !self.services.states.load_ram(&path) {
                tracing::warn!(path = %path.display(), "failed to load save RAM");
            }
        }
        self.execute(E::AutosaveInit);
        true
    }
}

fn slot_label(slot: i32) -> String {
    if slot == AUTO_SLOT {
        "Auto".to_string()
    } else {
        slot.to_string()
    }
}
