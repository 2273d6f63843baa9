//! Shared test utilities for integration and unit tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use hashbrown::HashSet;
use retrocmd_shared::ActionId;

use crate::command::{ActionHandler, ByteSource, ReplySink};
use crate::config::Config;
use crate::event::{Dispatcher, EventCommand};
use crate::services::headless::DiskSet;
use crate::services::{
    AudioDriver, AvRecorder, CheatManager, ConfigOverrides, ContentInfo, Core, CoreType,
    DiskControl, InputDriver, MemoryError, MemoryMap, MovieRecorder, Netplay, OverrideScope,
    Playlist, Rewind, SaveStates, Services, VideoDriver,
};

// ============================================================================
// Fake collaborators
// ============================================================================

/// State shared by every fake collaborator of one test.
#[derive(Debug, Default)]
pub struct World {
    /// Every collaborator call, in order (`"audio.stop"`, `"states.save"`...).
    pub log: Vec<String>,
    /// Calls that report failure.
    pub fail: HashSet<&'static str>,
    pub content: Option<ContentInfo>,
    pub serialize_size: usize,
    pub netplay_connected: bool,
    pub rewind_active: bool,
    pub cheats: Vec<bool>,
    pub audio_alive: bool,
    pub muted: bool,
    pub gain: f32,
    pub grabs_stdin: bool,
    pub history: Vec<PathBuf>,
}

pub type Shared = Rc<RefCell<World>>;

pub fn world() -> Shared {
    Rc::new(RefCell::new(World {
        serialize_size: 64,
        gain: 1.0,
        ..World::default()
    }))
}

/// Log `name` and report whether it should succeed.
fn call(world: &Shared, name: &'static str) -> bool {
    let mut world = world.borrow_mut();
    world.log.push(name.to_string());
    !world.fail.contains(name)
}

/// Calls logged so far whose name starts with `prefix`.
pub fn calls(world: &Shared, prefix: &str) -> Vec<String> {
    world
        .borrow()
        .log
        .iter()
        .filter(|entry| entry.starts_with(prefix))
        .cloned()
        .collect()
}

/// Flat RAM with a read-only window at `0x8000..`.
#[derive(Debug)]
pub struct FakeMemory {
    pub ram: Vec<u8>,
}

impl FakeMemory {
    pub const READ_ONLY_START: u32 = 0x8000;

    pub fn new(size: usize) -> Self {
        Self { ram: vec![0; size] }
    }

    fn range(&self, address: u32, len: usize) -> Option<std::ops::Range<usize>> {
        let start = address as usize;
        let end = start.checked_add(len)?;
        (end <= self.ram.len()).then_some(start..end)
    }
}

impl MemoryMap for FakeMemory {
    fn read_ram(&self, address: u32, out: &mut [u8]) -> bool {
        match self.range(address, out.len()) {
            Some(range) => {
                out.copy_from_slice(&self.ram[range]);
                true
            }
            None => false,
        }
    }

    fn write_ram(&mut self, address: u32, data: &[u8]) -> bool {
        match self.range(address, data.len()) {
            Some(range) => {
                self.ram[range].copy_from_slice(data);
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
        if address >= Self::READ_ONLY_START {
            return Err(MemoryError::ReadOnly);
        }
        if self.write_ram(address, data) {
            Ok(data.len())
        } else {
            Err(MemoryError::OutOfRange)
        }
    }
}

/// Core fake. Owns the disk set and memory so it can lend them out.
pub struct FakeCore {
    world: Shared,
    pub disks: Option<DiskSet>,
    pub memory: Option<FakeMemory>,
}

impl FakeCore {
    pub fn new(world: &Shared) -> Self {
        Self {
            world: world.clone(),
            disks: None,
            memory: Some(FakeMemory::new(0x10000)),
        }
    }

    pub fn with_disks(mut self, disks: DiskSet) -> Self {
        self.disks = Some(disks);
        self
    }

    pub fn without_memory(mut self) -> Self {
        self.memory = None;
        self
    }
}

impl Core for FakeCore {
    fn load(&mut self, _path: &Path) -> bool {
        call(&self.world, "core.load")
    }

    fn init(&mut self, core_type: CoreType, content: Option<&Path>) -> bool {
        if !call(&self.world, "core.init") {
            return false;
        }
        self.world.borrow_mut().content = match core_type {
            CoreType::Plain => content.map(|path| ContentInfo {
                path: path.to_path_buf(),
                name: path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                system_id: "fake".to_string(),
                crc32: 0xdead_beef,
            }),
            _ => None,
        };
        true
    }

    fn unload(&mut self) {
        call(&self.world, "core.unload");
        self.world.borrow_mut().content = None;
    }

    fn reset(&mut self) {
        call(&self.world, "core.reset");
    }

    fn run_frame(&mut self) {
        call(&self.world, "core.run_frame");
    }

    fn serialize_size(&self) -> usize {
        self.world.borrow().serialize_size
    }

    fn content(&self) -> Option<ContentInfo> {
        self.world.borrow().content.clone()
    }

    fn set_controller_port_device(&mut self, _port: u32, _device: u32) {
        call(&self.world, "core.set_controller_port_device");
    }

    fn disk_control(&mut self) -> Option<&mut dyn DiskControl> {
        self.disks.as_mut().map(|disks| disks as &mut dyn DiskControl)
    }

    fn memory(&mut self) -> Option<&mut dyn MemoryMap> {
        self.memory.as_mut().map(|memory| memory as &mut dyn MemoryMap)
    }
}

/// Every non-core collaborator, backed by the shared [`World`].
#[derive(Clone)]
pub struct Fake(pub Shared);

impl SaveStates for Fake {
    fn save(&mut self, path: &Path) -> bool {
        call(&self.0, "states.save") && std::fs::write(path, b"state").is_ok()
    }

    fn load(&mut self, path: &Path) -> bool {
        call(&self.0, "states.load") && path.exists()
    }

    fn undo_save(&mut self) -> bool {
        call(&self.0, "states.undo_save")
    }

    fn undo_load(&mut self) -> bool {
        call(&self.0, "states.undo_load")
    }

    fn save_ram(&mut self, path: &Path) -> bool {
        call(&self.0, "states.save_ram") && std::fs::write(path, b"sram").is_ok()
    }

    fn load_ram(&mut self, _path: &Path) -> bool {
        call(&self.0, "states.load_ram")
    }
}

impl Rewind for Fake {
    fn init(&mut self, _buffer_size: usize) -> bool {
        let ok = call(&self.0, "rewind.init");
        self.0.borrow_mut().rewind_active = ok;
        ok
    }

    fn deinit(&mut self) {
        call(&self.0, "rewind.deinit");
        self.0.borrow_mut().rewind_active = false;
    }

    fn is_active(&self) -> bool {
        self.0.borrow().rewind_active
    }
}

impl Netplay for Fake {
    fn init(&mut self, _host: Option<&str>, _port: u16) -> bool {
        let ok = call(&self.0, "netplay.init");
        self.0.borrow_mut().netplay_connected = ok;
        ok
    }

    fn deinit(&mut self) {
        call(&self.0, "netplay.deinit");
        self.0.borrow_mut().netplay_connected = false;
    }

    fn is_connected(&self) -> bool {
        self.0.borrow().netplay_connected
    }

    fn flip_players(&mut self) -> bool {
        call(&self.0, "netplay.flip_players")
    }

    fn game_watch(&mut self) -> bool {
        call(&self.0, "netplay.game_watch")
    }
}

impl CheatManager for Fake {
    fn load(&mut self) -> bool {
        call(&self.0, "cheats.load")
    }

    fn free(&mut self) {
        call(&self.0, "cheats.free");
    }

    fn apply(&mut self) -> bool {
        call(&self.0, "cheats.apply")
    }

    fn count(&self) -> usize {
        self.0.borrow().cheats.len()
    }

    fn toggle(&mut self, index: usize) -> Option<bool> {
        call(&self.0, "cheats.toggle");
        let mut world = self.0.borrow_mut();
        let cheat = world.cheats.get_mut(index)?;
        *cheat = !*cheat;
        Some(*cheat)
    }
}

impl ConfigOverrides for Fake {
    fn load_override(&mut self) -> bool {
        call(&self.0, "overrides.load_override")
    }

    fn unload_override(&mut self) -> bool {
        call(&self.0, "overrides.unload_override")
    }

    fn save_override(&mut self, _scope: OverrideScope) -> bool {
        call(&self.0, "overrides.save_override")
    }

    fn load_remap(&mut self) -> bool {
        call(&self.0, "overrides.load_remap")
    }

    fn unload_remap(&mut self) {
        call(&self.0, "overrides.unload_remap");
    }
}

impl Playlist for Fake {
    fn load(&mut self, _path: &Path, _max_entries: usize) -> bool {
        call(&self.0, "history.load")
    }

    fn push(&mut self, entry: &ContentInfo) -> bool {
        let ok = call(&self.0, "history.push");
        if ok {
            self.0.borrow_mut().history.push(entry.path.clone());
        }
        ok
    }

    fn write(&mut self) -> bool {
        call(&self.0, "history.write")
    }

    fn free(&mut self) {
        call(&self.0, "history.free");
    }
}

impl AudioDriver for Fake {
    fn init(&mut self) -> bool {
        let ok = call(&self.0, "audio.init");
        self.0.borrow_mut().audio_alive = ok;
        ok
    }

    fn deinit(&mut self) {
        call(&self.0, "audio.deinit");
        self.0.borrow_mut().audio_alive = false;
    }

    fn start(&mut self) -> bool {
        let ok = call(&self.0, "audio.start");
        if ok {
            self.0.borrow_mut().audio_alive = true;
        }
        ok
    }

    fn stop(&mut self) -> bool {
        let ok = call(&self.0, "audio.stop");
        if ok {
            self.0.borrow_mut().audio_alive = false;
        }
        ok
    }

    fn is_alive(&self) -> bool {
        self.0.borrow().audio_alive
    }

    fn set_mute(&mut self, muted: bool) -> bool {
        let ok = call(&self.0, "audio.set_mute");
        if ok {
            self.0.borrow_mut().muted = muted;
        }
        ok
    }

    fn set_volume_gain(&mut self, gain: f32) {
        call(&self.0, "audio.set_volume_gain");
        self.0.borrow_mut().gain = gain;
    }

    fn set_nonblocking(&mut self, _nonblocking: bool) {
        call(&self.0, "audio.set_nonblocking");
    }

    fn dsp_filter_init(&mut self, _path: &Path) -> bool {
        call(&self.0, "audio.dsp_filter_init")
    }

    fn dsp_filter_deinit(&mut self) {
        call(&self.0, "audio.dsp_filter_deinit");
    }
}

impl VideoDriver for Fake {
    fn init(&mut self) -> bool {
        call(&self.0, "video.init")
    }

    fn deinit(&mut self) {
        call(&self.0, "video.deinit");
    }

    fn has_windowed(&self) -> bool {
        true
    }

    fn set_fullscreen(&mut self, _fullscreen: bool) {
        call(&self.0, "video.set_fullscreen");
    }

    fn screenshot(&mut self, path: &Path) -> bool {
        call(&self.0, "video.screenshot") && std::fs::write(path, b"png").is_ok()
    }

    fn set_shader(&mut self, _preset: Option<&Path>) -> bool {
        call(&self.0, "video.set_shader")
    }

    fn set_nonblocking(&mut self, _nonblocking: bool) {
        call(&self.0, "video.set_nonblocking");
    }

    fn set_aspect_ratio(&mut self) {
        call(&self.0, "video.set_aspect_ratio");
    }

    fn apply_state_changes(&mut self) {
        call(&self.0, "video.apply_state_changes");
    }

    fn show_mouse(&mut self, _visible: bool) {
        call(&self.0, "video.show_mouse");
    }
}

impl InputDriver for Fake {
    fn init(&mut self) -> bool {
        call(&self.0, "input.init")
    }

    fn deinit(&mut self) {
        call(&self.0, "input.deinit");
    }

    fn poll(&mut self) {
        call(&self.0, "input.poll");
    }

    fn grabs_stdin(&self) -> bool {
        self.0.borrow().grabs_stdin
    }

    fn grab_mouse(&mut self, _grab: bool) -> bool {
        call(&self.0, "input.grab_mouse")
    }

    fn set_game_focus(&mut self, _focused: bool) {
        call(&self.0, "input.set_game_focus");
    }

    fn set_rumble(&mut self, _port: u32, _strong: u16, _weak: u16) {
        call(&self.0, "input.set_rumble");
    }

    fn overlay_load(&mut self, _path: &Path) -> bool {
        call(&self.0, "input.overlay_load")
    }

    fn overlay_unload(&mut self) {
        call(&self.0, "input.overlay_unload");
    }

    fn overlay_next(&mut self) -> bool {
        call(&self.0, "input.overlay_next")
    }
}

impl MovieRecorder for Fake {
    fn start_recording(&mut self, _path: &Path) -> bool {
        call(&self.0, "movie.start_recording")
    }

    fn start_playback(&mut self, _path: &Path) -> bool {
        call(&self.0, "movie.start_playback")
    }

    fn stop(&mut self) {
        call(&self.0, "movie.stop");
    }
}

impl AvRecorder for Fake {
    fn start(&mut self, _path: &Path, _streaming: bool) -> bool {
        call(&self.0, "recorder.start")
    }

    fn stop(&mut self) -> bool {
        call(&self.0, "recorder.stop")
    }
}

/// Services backed by `world`, with `core` as the core.
pub fn fake_services_with(world: &Shared, core: FakeCore) -> Services {
    let fake = Fake(world.clone());
    Services {
        core: Box::new(core),
        states: Box::new(fake.clone()),
        rewind: Box::new(fake.clone()),
        netplay: Box::new(fake.clone()),
        cheats: Box::new(fake.clone()),
        overrides: Box::new(fake.clone()),
        history: Box::new(fake.clone()),
        audio: Box::new(fake.clone()),
        video: Box::new(fake.clone()),
        input: Box::new(fake.clone()),
        movie: Box::new(fake.clone()),
        recorder: Box::new(fake),
    }
}

pub fn fake_services(world: &Shared) -> Services {
    fake_services_with(world, FakeCore::new(world))
}

/// Dispatcher over fakes with content `game.bin` loaded from `dir`.
///
/// The config keeps save states and save RAM in `dir`.
pub fn loaded_dispatcher(dir: &Path, world: &Shared, core: FakeCore) -> Dispatcher {
    let mut config = Config::default();
    config.savestate.directory = Some(dir.to_path_buf());
    config.savestate.savefile_directory = Some(dir.to_path_buf());
    config.video.screenshot_directory = Some(dir.join("screenshots"));
    config.paths.recording_directory = Some(dir.join("recordings"));

    let content = dir.join("game.bin");
    std::fs::write(&content, b"rom").unwrap();

    let mut dispatcher = Dispatcher::new(config, fake_services_with(world, core));
    assert!(dispatcher.execute(EventCommand::LoadCore(dir.join("fake_libretro.so"))));
    assert!(dispatcher.execute(EventCommand::LoadContent(content)));
    world.borrow_mut().log.clear();
    dispatcher
}

// ============================================================================
// Transport helpers
// ============================================================================

/// Cloneable in-memory writer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(pub Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Byte source returning queued chunks, one per read.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource(pub Rc<RefCell<VecDeque<Vec<u8>>>>);

impl ScriptedSource {
    pub fn push(&self, bytes: impl Into<Vec<u8>>) {
        self.0.borrow_mut().push_back(bytes.into());
    }
}

impl ByteSource for ScriptedSource {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut queue = self.0.borrow_mut();
        let Some(mut chunk) = queue.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            queue.push_front(chunk.split_off(n));
        }
        Ok(n)
    }
}

/// Action handler that records calls and answers `VERSION`.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub actions: Vec<(ActionId, Option<String>)>,
}

impl ActionHandler for RecordingHandler {
    fn handle_action(
        &mut self,
        action: ActionId,
        arg: Option<&str>,
        reply: &mut dyn ReplySink,
    ) -> bool {
        self.actions.push((action, arg.map(str::to_string)));
        if action == ActionId::Version {
            reply.reply(b"test-version\n");
        }
        true
    }
}
