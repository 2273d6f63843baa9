//! Disk image control for multi-disk content

use std::path::Path;

use super::{Dispatcher, EventCommand};

const NOT_SUPPORTED: &str = "Core does not support Disk Options.";
const TRAY_CLOSED: &str = "Open the virtual disk tray before changing disks.";

impl Dispatcher {
    fn disk_unsupported(&mut self) -> bool {
        tracing::warn!("core has no disk control interface");
        self.notify(NOT_SUPPORTED);
        false
    }

    pub(super) fn disk_eject_toggle(&mut self) -> bool {
        let Some(disk) = self.services.core.disk_control() else {
            return self.disk_unsupported();
        };

        let eject = !disk.eject_state();
        if !disk.set_eject_state(eject) {
            tracing::error!(eject, "failed to change disk tray state");
            self.notify(if eject {
                "Failed to eject virtual disk tray."
            } else {
                "Failed to close virtual disk tray."
            });
            return false;
        }

        tracing::info!(eject, index = disk.image_index(), "disk tray toggled");
        self.notify(if eject {
            "Ejected virtual disk tray."
        } else {
            "Closed virtual disk tray."
        });
        true
    }

    /// Move to the neighbouring image. Clamped to `[0, count-1]`; the tray
    /// must be open.
    pub(super) fn disk_step(&mut self, delta: i64) -> bool {
        let Some(disk) = self.services.core.disk_control() else {
            return self.disk_unsupported();
        };

        let count = disk.num_images();
        if count == 0 {
            tracing::error!("disk control reports no images");
            return false;
        }
        if !disk.eject_state() {
            self.notify(TRAY_CLOSED);
            return false;
        }

        let current = i64::from(disk.image_index());
        let target = (current + delta).clamp(0, i64::from(count) - 1) as u32;
        if !disk.set_image_index(target) {
            tracing::error!(index = target, "failed to set disk index");
            return false;
        }

        tracing::info!(index = target, count, "disk index changed");
        self.notify(format!("Current disk index: {}/{}", target + 1, count));
        true
    }

    /// Select image `index`; `index == count` leaves the tray empty.
    pub(super) fn disk_set_index(&mut self, index: u32) -> bool {
        let Some(disk) = self.services.core.disk_control() else {
            return self.disk_unsupported();
        };

        let count = disk.num_images();
        if count == 0 {
            tracing::error!("disk control reports no images");
            return false;
        }
        if index > count {
            tracing::warn!(index, count, "disk index out of range");
            return false;
        }
        if !disk.set_image_index(index) {
            tracing::error!(index, "failed to set disk index");
            return false;
        }

        if index == count {
            self.notify("Removed disk from tray.");
        } else {
            self.notify(format!("Current disk index: {}/{}", index + 1, count));
        }
        true
    }

    /// Add `path` as a new disk image.
    ///
    /// The save-data context changes with the disk set, so autosave is torn
    /// down first and re-armed afterwards. The original index and tray state
    /// are restored whether or not the append succeeds.
    pub(super) fn disk_append_image(&mut self, path: &Path) -> bool {
        if self.services.core.disk_control().is_none() {
            return self.disk_unsupported();
        }

        self.execute(EventCommand::AutosaveDeinit);
        let appended = self.append_to_disk_set(path);
        self.execute(EventCommand::AutosaveInit);

        match appended {
            Ok(index) => {
                tracing::info!(path = %path.display(), index, "disk image appended");
                self.notify(format!("Appended disk: {}", display_name(path)));
                true
            }
            Err(reason) => {
                tracing::error!(path = %path.display(), "failed to append disk image: {reason}");
                self.notify(format!("Failed to append disk: {}", display_name(path)));
                false
            }
        }
    }

    fn append_to_disk_set(&mut self, path: &Path) -> Result<u32, &'static str> {
        let Some(disk) = self.services.core.disk_control() else {
            return Err("disk control unavailable");
        };

        let was_ejected = disk.eject_state();
        let original_index = disk.image_index();

        if !was_ejected && !disk.set_eject_state(true) {
            return Err("could not open the disk tray");
        }

        let result = if !disk.add_image_index() {
            Err("could not add an image slot")
        } else {
            let new_index = disk.num_images().saturating_sub(1);
            if disk.replace_image_index(new_index, Some(path)) {
                Ok(new_index)
            } else {
                disk.replace_image_index(new_index, None);
                Err("core rejected the image")
            }
        };

        disk.set_image_index(original_index);
        if !was_ejected {
            disk.set_eject_state(false);
        }
        result
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
