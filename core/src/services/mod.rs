//! External collaborators consumed by the event dispatcher
//!
//! The dispatcher coordinates these services but never implements them. Each
//! trait is deliberately narrow: the handful of entry points the lifecycle
//! operations need, returning `bool` for success so failures can degrade the
//! owning subsystem without aborting the frontend.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod headless;

/// Kind of core being initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoreType {
    /// Regular core running user content.
    #[default]
    Plain,
    /// Built-in placeholder core used when nothing is loaded.
    Dummy,
    /// Core started without content (e.g. a game engine with no ROM).
    NoContent,
}

/// Metadata about the content currently running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInfo {
    pub path: PathBuf,
    /// Display name, usually the file stem of `path`.
    pub name: String,
    /// System identifier reported by the core (e.g. `snes`).
    pub system_id: String,
    pub crc32: u32,
}

/// Controller device ids understood by cores.
pub mod device {
    pub const NONE: u32 = 0;
    pub const JOYPAD: u32 = 1;
}

/// Errors reported by [`MemoryMap`] address-space accesses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("no memory map defined")]
    NoMemoryMap,
    #[error("address out of range")]
    OutOfRange,
    #[error("descriptor is read-only")]
    ReadOnly,
}

/// The loaded core.
pub trait Core {
    /// Load a core library from `path`.
    fn load(&mut self, path: &Path) -> bool;
    /// Initialize the core and its content.
    fn init(&mut self, core_type: CoreType, content: Option<&Path>) -> bool;
    /// Unload content and deinitialize the core.
    fn unload(&mut self);
    fn reset(&mut self);
    /// Run one emulated frame.
    fn run_frame(&mut self);
    /// Size of a serialized state; zero means save states are unsupported.
    fn serialize_size(&self) -> usize;
    fn content(&self) -> Option<ContentInfo>;
    fn set_controller_port_device(&mut self, port: u32, device: u32);
    /// Multi-disk image control, if the core exposes it.
    fn disk_control(&mut self) -> Option<&mut dyn DiskControl> {
        None
    }
    /// Emulated memory access, if the core exposes it.
    fn memory(&mut self) -> Option<&mut dyn MemoryMap> {
        None
    }
}

/// Core-supplied disk image switching.
pub trait DiskControl {
    fn num_images(&self) -> u32;
    fn image_index(&self) -> u32;
    fn eject_state(&self) -> bool;
    fn set_eject_state(&mut self, ejected: bool) -> bool;
    /// Select an image; `index == num_images()` removes the disk from the tray.
    fn set_image_index(&mut self, index: u32) -> bool;
    /// Append an empty image slot.
    fn add_image_index(&mut self) -> bool;
    /// Replace an image slot; `None` removes the slot.
    fn replace_image_index(&mut self, index: u32, path: Option<&Path>) -> bool;
}

/// Emulated memory access.
pub trait MemoryMap {
    /// Read from the flat system RAM block.
    fn read_ram(&self, address: u32, out: &mut [u8]) -> bool;
    /// Write to the flat system RAM block.
    fn write_ram(&mut self, address: u32, data: &[u8]) -> bool;
    /// Read through the core's memory descriptors.
    fn read(&self, address: u32, out: &mut [u8]) -> Result<(), MemoryError>;
    /// Write through the core's memory descriptors, returning bytes written.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<usize, MemoryError>;
}

/// Save state and save RAM persistence.
pub trait SaveStates {
    fn save(&mut self, path: &Path) -> bool;
    fn load(&mut self, path: &Path) -> bool;
    /// Restore the file overwritten by the last save.
    fn undo_save(&mut self) -> bool;
    /// Return to the state from before the last load.
    fn undo_load(&mut self) -> bool;
    fn save_ram(&mut self, path: &Path) -> bool;
    fn load_ram(&mut self, path: &Path) -> bool;
}

/// Rewind buffer.
pub trait Rewind {
    fn init(&mut self, buffer_size: usize) -> bool;
    fn deinit(&mut self);
    fn is_active(&self) -> bool;
}

/// Netplay session manager.
pub trait Netplay {
    /// Connect to `host`, or start hosting when `host` is `None`.
    fn init(&mut self, host: Option<&str>, port: u16) -> bool;
    fn deinit(&mut self);
    fn is_connected(&self) -> bool;
    fn flip_players(&mut self) -> bool;
    /// Switch between playing and spectating.
    fn game_watch(&mut self) -> bool;
}

/// Cheat list for the running content.
pub trait CheatManager {
    fn load(&mut self) -> bool;
    fn free(&mut self);
    fn apply(&mut self) -> bool;
    fn count(&self) -> usize;
    /// Flip cheat `index`, returning its new enabled state.
    fn toggle(&mut self, index: usize) -> Option<bool>;
}

/// Scope of a configuration override file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideScope {
    Core,
    ContentDirectory,
    Game,
}

/// Configuration override and input remap files.
pub trait ConfigOverrides {
    fn load_override(&mut self) -> bool;
    fn unload_override(&mut self) -> bool;
    fn save_override(&mut self, scope: OverrideScope) -> bool;
    fn load_remap(&mut self) -> bool;
    fn unload_remap(&mut self);
}

/// Content history playlist.
pub trait Playlist {
    fn load(&mut self, path: &Path, max_entries: usize) -> bool;
    fn push(&mut self, entry: &ContentInfo) -> bool;
    fn write(&mut self) -> bool;
    fn free(&mut self);
}

pub trait AudioDriver {
    fn init(&mut self) -> bool;
    fn deinit(&mut self);
    fn start(&mut self) -> bool;
    fn stop(&mut self) -> bool;
    fn is_alive(&self) -> bool;
    fn set_mute(&mut self, muted: bool) -> bool;
    fn set_volume_gain(&mut self, gain: f32);
    fn set_nonblocking(&mut self, nonblocking: bool);
    fn dsp_filter_init(&mut self, path: &Path) -> bool;
    fn dsp_filter_deinit(&mut self);
}

pub trait VideoDriver {
    fn init(&mut self) -> bool;
    fn deinit(&mut self);
    /// Whether the driver can switch between windowed and fullscreen.
    fn has_windowed(&self) -> bool;
    fn set_fullscreen(&mut self, fullscreen: bool);
    fn screenshot(&mut self, path: &Path) -> bool;
    /// Apply a shader preset; `None` restores the default pipeline.
    fn set_shader(&mut self, preset: Option<&Path>) -> bool;
    fn set_nonblocking(&mut self, nonblocking: bool);
    fn set_aspect_ratio(&mut self);
    fn apply_state_changes(&mut self);
    fn show_mouse(&mut self, visible: bool);
}

pub trait InputDriver {
    fn init(&mut self) -> bool;
    fn deinit(&mut self);
    fn poll(&mut self);
    /// Whether the driver reads stdin itself (e.g. a tty joypad driver).
    fn grabs_stdin(&self) -> bool;
    fn grab_mouse(&mut self, grab: bool) -> bool;
    fn set_game_focus(&mut self, focused: bool);
    fn set_rumble(&mut self, port: u32, strong: u16, weak: u16);
    fn overlay_load(&mut self, path: &Path) -> bool;
    fn overlay_unload(&mut self);
    fn overlay_next(&mut self) -> bool;
}

/// Input movie (BSV) recorder and player.
pub trait MovieRecorder {
    fn start_recording(&mut self, path: &Path) -> bool;
    fn start_playback(&mut self, path: &Path) -> bool;
    fn stop(&mut self);
}

/// Audio/video capture to a file or stream.
pub trait AvRecorder {
    fn start(&mut self, path: &Path, streaming: bool) -> bool;
    fn stop(&mut self) -> bool;
}

/// All collaborators owned by the dispatcher.
pub struct Services {
    pub core: Box<dyn Core>,
    pub states: Box<dyn SaveStates>,
    pub rewind: Box<dyn Rewind>,
    pub netplay: Box<dyn Netplay>,
    pub cheats: Box<dyn CheatManager>,
    pub overrides: Box<dyn ConfigOverrides>,
    pub history: Box<dyn Playlist>,
    pub audio: Box<dyn AudioDriver>,
    pub video: Box<dyn VideoDriver>,
    pub input: Box<dyn InputDriver>,
    pub movie: Box<dyn MovieRecorder>,
    pub recorder: Box<dyn AvRecorder>,
}
