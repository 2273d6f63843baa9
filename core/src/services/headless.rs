//! In-memory collaborators for running the command interface without a real
//! core or drivers.
//!
//! The headless core keeps a flat RAM block and a virtual disk set so memory
//! and disk commands have something to act on. Save states and save RAM are
//! written as RAM snapshots; the remaining drivers only track their state.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use hashbrown::HashSet;

use super::{
    AudioDriver, AvRecorder, CheatManager, ConfigOverrides, ContentInfo, Core, CoreType,
    DiskControl, InputDriver, MemoryError, MemoryMap, MovieRecorder, Netplay, OverrideScope,
    Playlist, Rewind, SaveStates, Services, VideoDriver,
};

/// Size of the headless core's system RAM.
pub const HEADLESS_RAM_SIZE: usize = 64 * 1024;

/// RAM shared between the headless core and its save states.
type SharedRam = Rc<RefCell<Vec<u8>>>;

impl Services {
    /// Headless collaborators.
    pub fn headless() -> Self {
        let ram: SharedRam = Rc::new(RefCell::new(vec![0u8; HEADLESS_RAM_SIZE]));
        Self {
            core: Box::new(HeadlessCore::new(ram.clone())),
            states: Box::new(SnapshotStates::new(ram)),
            rewind: Box::<BufferRewind>::default(),
            netplay: Box::new(NoNetplay),
            cheats: Box::<NoCheats>::default(),
            overrides: Box::new(NoOverrides),
            history: Box::<MemoryPlaylist>::default(),
            audio: Box::<NullAudio>::default(),
            video: Box::<NullVideo>::default(),
            input: Box::<NullInput>::default(),
            movie: Box::<NullMovie>::default(),
            recorder: Box::<NullRecorder>::default(),
        }
    }
}

/// Multi-disk image set.
#[derive(Debug, Default)]
pub struct DiskSet {
    images: Vec<Option<PathBuf>>,
    index: u32,
    ejected: bool,
}

impl DiskSet {
    pub fn new(images: Vec<PathBuf>) -> Self {
        Self {
            images: images.into_iter().map(Some).collect(),
            index: 0,
            ejected: false,
        }
    }

    pub fn current(&self) -> Option<&Path> {
        self.images.get(self.index as usize)?.as_deref()
    }
}

impl DiskControl for DiskSet {
    fn num_images(&self) -> u32 {
        self.images.len() as u32
    }

    fn image_index(&self) -> u32 {
        self.index
    }

    fn eject_state(&self) -> bool {
        self.ejected
    }

    fn set_eject_state(&mut self, ejected: bool) -> bool {
        self.ejected = ejected;
        true
    }

    fn set_image_index(&mut self, index: u32) -> bool {
        if !self.ejected || index as usize > self.images.len() {
            return false;
        }
        self.index = index;
        true
    }

    fn add_image_index(&mut self) -> bool {
        if !self.ejected {
            return false;
        }
        self.images.push(None);
        true
    }

    fn replace_image_index(&mut self, index: u32, path: Option<&Path>) -> bool {
        let index = index as usize;
        if !self.ejected || index >= self.images.len() {
            return false;
        }
        match path {
            Some(path) => self.images[index] = Some(path.to_path_buf()),
            None => {
                self.images.remove(index);
                if self.index as usize > self.images.len() {
                    self.index = self.images.len() as u32;
                }
            }
        }
        true
    }
}

/// Flat RAM exposed both as system RAM and as a single memory descriptor.
pub struct HeadlessMemory {
    ram: SharedRam,
}

fn ram_range(len: usize, address: u32, count: usize) -> Option<std::ops::Range<usize>> {
    let start = address as usize;
    let end = start.checked_add(count)?;
    (end <= len).then_some(start..end)
}

impl MemoryMap for HeadlessMemory {
    fn read_ram(&self, address: u32, out: &mut [u8]) -> bool {
        let ram = self.ram.borrow();
        match ram_range(ram.len(), address, out.len()) {
            Some(range) => {
                out.copy_from_slice(&ram[range]);
                true
            }
            None => false,
        }
    }

    fn write_ram(&mut self, address: u32, data: &[u8]) -> bool {
        let mut ram = self.ram.borrow_mut();
        match ram_range(ram.len(), address, data.len()) {
            Some(range) => {
                ram[range].copy_from_slice(data);
                true
            }
            None => false,
        }
    }

    fn read(&self, address: u32, out: &mut [u8]) -> Result<(), MemoryError> {
        if self.read_ram(address, out) {
            Ok(())
        } else {
            Err(MemoryError::OutOfRange)
        }
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<usize, MemoryError> {
        if self.write_ram(address, data) {
            Ok(data.len())
        } else {
            Err(MemoryError::OutOfRange)
        }
    }
}

/// Core stand-in: accepts any core path and content, counts frames.
pub struct HeadlessCore {
    loaded: Option<PathBuf>,
    content: Option<ContentInfo>,
    running: bool,
    frames: u64,
    memory: HeadlessMemory,
    disks: DiskSet,
}

impl HeadlessCore {
    pub fn new(ram: SharedRam) -> Self {
        Self {
            loaded: None,
            content: None,
            running: false,
            frames: 0,
            memory: HeadlessMemory { ram },
            disks: DiskSet::default(),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Core for HeadlessCore {
    fn load(&mut self, path: &Path) -> bool {
        tracing::debug!(path = %path.display(), "headless core load");
        self.loaded = Some(path.to_path_buf());
        true
    }

    fn init(&mut self, core_type: CoreType, content: Option<&Path>) -> bool {
        self.content = content.map(|path| {
            let crc32 = std::fs::read(path).map(|data| crc32fast::hash(&data)).unwrap_or(0);
            ContentInfo {
                path: path.to_path_buf(),
                name: path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                system_id: "headless".to_string(),
                crc32,
            }
        });
        self.disks = match (core_type, content) {
            (CoreType::Plain, Some(path)) => DiskSet::new(vec![path.to_path_buf()]),
            _ => DiskSet::default(),
        };
        self.memory.ram.borrow_mut().fill(0);
        self.frames = 0;
        self.running = true;
        true
    }

    fn unload(&mut self) {
        self.content = None;
        self.running = false;
    }

    fn reset(&mut self) {
        self.memory.ram.borrow_mut().fill(0);
        self.frames = 0;
    }

    fn run_frame(&mut self) {
        if !self.running {
            return;
        }
        self.frames += 1;
        // Frame counter at the start of RAM so memory reads observe progress
        let bytes = (self.frames as u32).to_le_bytes();
        self.memory.ram.borrow_mut()[..4].copy_from_slice(&bytes);
    }

    fn serialize_size(&self) -> usize {
        if self.running { HEADLESS_RAM_SIZE } else { 0 }
    }

    fn content(&self) -> Option<ContentInfo> {
        self.content.clone()
    }

    fn set_controller_port_device(&mut self, port: u32, device: u32) {
        tracing::trace!(port, device, "controller port device");
    }

    fn disk_control(&mut self) -> Option<&mut dyn DiskControl> {
        if self.content.is_some() {
            Some(&mut self.disks)
        } else {
            None
        }
    }

    fn memory(&mut self) -> Option<&mut dyn MemoryMap> {
        if self.running {
            Some(&mut self.memory)
        } else {
            None
        }
    }
}

/// Save states as raw RAM snapshots on disk.
pub struct SnapshotStates {
    ram: SharedRam,
    /// Previous contents of the last overwritten state file.
    undo_save: Option<(PathBuf, Option<Vec<u8>>)>,
    /// RAM from before the last load.
    undo_load: Option<Vec<u8>>,
}

impl SnapshotStates {
    pub fn new(ram: SharedRam) -> Self {
        Self {
            ram,
            undo_save: None,
            undo_load: None,
        }
    }

    fn write(path: &Path, data: &[u8]) -> bool {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::error!(dir = %dir.display(), "failed to create directory: {e}");
                return false;
            }
        }
        match std::fs::write(path, data) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(path = %path.display(), "write failed: {e}");
                false
            }
        }
    }

    fn restore(&mut self, data: &[u8]) -> bool {
        let mut ram = self.ram.borrow_mut();
        if data.len() != ram.len() {
            return false;
        }
        ram.copy_from_slice(data);
        true
    }
}

impl SaveStates for SnapshotStates {
    fn save(&mut self, path: &Path) -> bool {
        let previous = std::fs::read(path).ok();
        let snapshot = self.ram.borrow().clone();
        if !Self::write(path, &snapshot) {
            return false;
        }
        self.undo_save = Some((path.to_path_buf(), previous));
        true
    }

    fn load(&mut self, path: &Path) -> bool {
        let Ok(data) = std::fs::read(path) else {
            return false;
        };
        let before = self.ram.borrow().clone();
        if !self.restore(&data) {
            return false;
        }
        self.undo_load = Some(before);
        true
    }

    fn undo_save(&mut self) -> bool {
        match self.undo_save.take() {
            Some((path, Some(previous))) => Self::write(&path, &previous),
            Some((path, None)) => std::fs::remove_file(path).is_ok(),
            None => false,
        }
    }

    fn undo_load(&mut self) -> bool {
        match self.undo_load.take() {
            Some(before) => self.restore(&before),
            None => false,
        }
    }

    fn save_ram(&mut self, path: &Path) -> bool {
        let snapshot = self.ram.borrow().clone();
        Self::write(path, &snapshot)
    }

    fn load_ram(&mut self, path: &Path) -> bool {
        match std::fs::read(path) {
            Ok(data) => self.restore(&data),
            Err(_) => false,
        }
    }
}

/// Tracks whether a rewind buffer of some size is allocated.
#[derive(Debug, Default)]
pub struct BufferRewind {
    capacity: Option<usize>,
}

impl Rewind for BufferRewind {
    fn init(&mut self, buffer_size: usize) -> bool {
        if buffer_size == 0 {
            return false;
        }
        self.capacity = Some(buffer_size);
        true
    }

    fn deinit(&mut self) {
        self.capacity = None;
    }

    fn is_active(&self) -> bool {
        self.capacity.is_some()
    }
}

/// No netplay backend is bundled.
pub struct NoNetplay;

impl Netplay for NoNetplay {
    fn init(&mut self, host: Option<&str>, port: u16) -> bool {
        tracing::warn!(host, port, "no netplay backend available");
        false
    }

    fn deinit(&mut self) {}

    fn is_connected(&self) -> bool {
        false
    }

    fn flip_players(&mut self) -> bool {
        false
    }

    fn game_watch(&mut self) -> bool {
        false
    }
}

/// Empty cheat list.
#[derive(Debug, Default)]
pub struct NoCheats {
    loaded: bool,
}

impl CheatManager for NoCheats {
    fn load(&mut self) -> bool {
        self.loaded = true;
        true
    }

    fn free(&mut self) {
        self.loaded = false;
    }

    fn apply(&mut self) -> bool {
        self.loaded
    }

    fn count(&self) -> usize {
        0
    }

    fn toggle(&mut self, _index: usize) -> Option<bool> {
        None
    }
}

/// No override or remap files.
pub struct NoOverrides;

impl ConfigOverrides for NoOverrides {
    fn load_override(&mut self) -> bool {
        false
    }

    fn unload_override(&mut self) -> bool {
        true
    }

    fn save_override(&mut self, scope: OverrideScope) -> bool {
        tracing::warn!(?scope, "override files are not supported headless");
        false
    }

    fn load_remap(&mut self) -> bool {
        false
    }

    fn unload_remap(&mut self) {}
}

/// History playlist kept in memory and written one path per line.
#[derive(Debug, Default)]
pub struct MemoryPlaylist {
    path: Option<PathBuf>,
    max_entries: usize,
    entries: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl MemoryPlaylist {
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }
}

impl Playlist for MemoryPlaylist {
    fn load(&mut self, path: &Path, max_entries: usize) -> bool {
        self.path = Some(path.to_path_buf());
        self.max_entries = max_entries;
        self.entries.clear();
        self.seen.clear();
        if let Ok(text) = std::fs::read_to_string(path) {
            for line in text.lines().filter(|line| !line.is_empty()) {
                let entry = PathBuf::from(line);
                if self.entries.len() < max_entries && self.seen.insert(entry.clone()) {
                    self.entries.push(entry);
                }
            }
        }
        true
    }

    fn push(&mut self, entry: &ContentInfo) -> bool {
        if self.max_entries == 0 {
            return false;
        }
        // Most recent first; an existing entry moves to the top
        if !self.seen.insert(entry.path.clone()) {
            self.entries.retain(|path| path != &entry.path);
        }
        self.entries.insert(0, entry.path.clone());
        while self.entries.len() > self.max_entries {
            if let Some(evicted) = self.entries.pop() {
                self.seen.remove(&evicted);
            }
        }
        true
    }

    fn write(&mut self) -> bool {
        let Some(path) = &self.path else {
            return false;
        };
        let mut text = String::new();
        for entry in &self.entries {
            text.push_str(&entry.to_string_lossy());
            text.push('\n');
        }
        SnapshotStates::write(path, text.as_bytes())
    }

    fn free(&mut self) {
        self.path = None;
        self.entries.clear();
        self.seen.clear();
    }
}

#[derive(Debug, Default)]
pub struct NullAudio {
    initialized: bool,
    running: bool,
    muted: bool,
    gain: f32,
}

impl AudioDriver for NullAudio {
    fn init(&mut self) -> bool {
        self.initialized = true;
        self.running = true;
        true
    }

    fn deinit(&mut self) {
        self.initialized = false;
        self.running = false;
    }

    fn start(&mut self) -> bool {
        self.running = self.initialized;
        self.running
    }

    fn stop(&mut self) -> bool {
        self.running = false;
        true
    }

    fn is_alive(&self) -> bool {
        self.running
    }

    fn set_mute(&mut self, muted: bool) -> bool {
        self.muted = muted;
        true
    }

    fn set_volume_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    fn set_nonblocking(&mut self, _nonblocking: bool) {}

    fn dsp_filter_init(&mut self, path: &Path) -> bool {
        path.exists()
    }

    fn dsp_filter_deinit(&mut self) {}
}

#[derive(Debug, Default)]
pub struct NullVideo {
    fullscreen: bool,
}

impl VideoDriver for NullVideo {
    fn init(&mut self) -> bool {
        true
    }

    fn deinit(&mut self) {}

    fn has_windowed(&self) -> bool {
        false
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    fn screenshot(&mut self, path: &Path) -> bool {
        tracing::warn!(path = %path.display(), "no framebuffer to capture headless");
        false
    }

    fn set_shader(&mut self, preset: Option<&Path>) -> bool {
        preset.is_none_or(Path::exists)
    }

    fn set_nonblocking(&mut self, _nonblocking: bool) {}

    fn set_aspect_ratio(&mut self) {}

    fn apply_state_changes(&mut self) {}

    fn show_mouse(&mut self, _visible: bool) {}
}

#[derive(Debug, Default)]
pub struct NullInput {
    overlay: Option<PathBuf>,
}

impl InputDriver for NullInput {
    fn init(&mut self) -> bool {
        true
    }

    fn deinit(&mut self) {}

    fn poll(&mut self) {}

    fn grabs_stdin(&self) -> bool {
        false
    }

    fn grab_mouse(&mut self, _grab: bool) -> bool {
        false
    }

    fn set_game_focus(&mut self, _focused: bool) {}

    fn set_rumble(&mut self, _port: u32, _strong: u16, _weak: u16) {}

    fn overlay_load(&mut self, path: &Path) -> bool {
        if !path.exists() {
            return false;
        }
        self.overlay = Some(path.to_path_buf());
        true
    }

    fn overlay_unload(&mut self) {
        self.overlay = None;
    }

    fn overlay_next(&mut self) -> bool {
        self.overlay.is_some()
    }
}

#[derive(Debug, Default)]
pub struct NullMovie {
    active: bool,
}

impl MovieRecorder for NullMovie {
    fn start_recording(&mut self, path: &Path) -> bool {
        self.active = SnapshotStates::write(path, &[]);
        self.active
    }

    fn start_playback(&mut self, path: &Path) -> bool {
        self.active = path.exists();
        self.active
    }

    fn stop(&mut self) {
        self.active = false;
    }
}

#[derive(Debug, Default)]
pub struct NullRecorder;

impl AvRecorder for NullRecorder {
    fn start(&mut self, path: &Path, streaming: bool) -> bool {
        tracing::warn!(path = %path.display(), streaming, "no encoder available headless");
        false
    }

    fn stop(&mut self) -> bool {
        true
    }
}
