//! Per-poll virtual button state

use retrocmd_shared::BindId;

/// One flag per bind id, cleared at the start of every poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandState {
    binds: [bool; BindId::COUNT],
}

impl Default for CommandState {
    fn default() -> Self {
        Self {
            binds: [false; BindId::COUNT],
        }
    }
}

impl CommandState {
    pub fn get(&self, id: BindId) -> bool {
        self.binds[id.index()]
    }

    pub fn set(&mut self, id: BindId) {
        self.binds[id.index()] = true;
    }

    /// Read by raw index. Out-of-range indices read as not pressed.
    pub fn get_index(&self, index: usize) -> bool {
        self.binds.get(index).copied().unwrap_or(false)
    }

    /// Set by raw index. Returns false and changes nothing if out of range.
    pub fn set_index(&mut self, index: usize) -> bool {
        match self.binds.get_mut(index) {
            Some(slot) => {
                *slot = true;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.binds = [false; BindId::COUNT];
    }

    /// Bind ids asserted in this window.
    pub fn pressed(&self) -> impl Iterator<Item = BindId> + '_ {
        BindId::ALL.iter().copied().filter(|id| self.get(*id))
    }

    pub fn any(&self) -> bool {
        self.binds.iter().any(|b| *b)
    }
}
