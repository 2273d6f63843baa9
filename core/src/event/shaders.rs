//! Shader preset directory cycling

use std::path::{Path, PathBuf};

use super::Dispatcher;

/// Preset file extensions recognized when scanning a shader directory.
const PRESET_EXTENSIONS: &[&str] = &["slangp", "glslp", "cgp"];

/// Sorted preset files from the shader directory and the current position.
#[derive(Debug, Default)]
pub struct ShaderList {
    presets: Vec<PathBuf>,
    index: Option<usize>,
}

impl ShaderList {
    /// Scan `dir` for preset files (non-recursive).
    pub fn scan(dir: &Path) -> std::io::Result<Self> {
        let mut presets: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| {
                        PRESET_EXTENSIONS
                            .iter()
                            .any(|known| ext.eq_ignore_ascii_case(known))
                    })
            })
            .collect();
        presets.sort();
        Ok(Self {
            presets,
            index: None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn clear(&mut self) {
        self.presets.clear();
        self.index = None;
    }

    /// Advance with wraparound. The first call selects the first (or last)
    /// entry.
    pub fn step(&mut self, forward: bool) -> Option<&Path> {
        let len = self.presets.len();
        if len == 0 {
            return None;
        }
        let next = match (self.index, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.index = Some(next);
        self.presets.get(next).map(PathBuf::as_path)
    }
}

impl Dispatcher {
    pub(super) fn shader_dir_init(&mut self) -> bool {
        let Some(dir) = self.config.video.shader_dir.clone() else {
            tracing::debug!("no shader directory configured");
            return false;
        };
        match ShaderList::scan(&dir) {
            Ok(list) => {
                tracing::info!(dir = %dir.display(), presets = list.len(), "shader directory scanned");
                self.shaders = list;
                !self.shaders.is_empty()
            }
            Err(e) => {
                tracing::error!(dir = %dir.display(), "failed to scan shader directory: {e}");
                false
            }
        }
    }

    pub(super) fn shader_cycle(&mut self, forward: bool) -> bool {
        if self.shaders.is_empty() && !self.shader_dir_init() {
            return false;
        }
        match self.shaders.step(forward).map(Path::to_path_buf) {
            Some(preset) => self.set_shader(preset),
            None => false,
        }
    }

    pub(super) fn set_shader(&mut self, preset: PathBuf) -> bool {
        if !self.services.video.set_shader(Some(&preset)) {
            tracing::error!(preset = %preset.display(), "failed to apply shader preset");
            self.notify(format!("Failed to apply shader: {}", preset.display()));
            return false;
        }

        let name = preset
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!(preset = %preset.display(), "shader applied");
        self.notify(format!("Shader: {name}"));
        self.state.shader_preset = Some(preset);
        true
    }

    pub(super) fn restore_default_shader(&mut self) -> bool {
        if self.state.shader_preset.take().is_none() {
            return false;
        }
        let default = self.config.video.shader_preset.clone();
        let ok = self.services.video.set_shader(default.as_deref());
        if !ok {
            tracing::error!("failed to restore default shader preset");
        }
        ok
    }
}
