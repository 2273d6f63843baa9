//! Bind ids: the virtual buttons a remote command can assert.
//!
//! A bind id is stable across releases because remote scripts refer to it by
//! token. The numeric index is only used to address the per-frame command
//! state array and never leaves the process.

macro_rules! bind_ids {
    ($($variant:ident => $token:literal,)+) => {
        /// Virtual button that can be asserted by a controller or a command.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum BindId {
            $($variant,)+
        }

        impl BindId {
            /// Every bind id, in index order.
            pub const ALL: &'static [BindId] = &[$(BindId::$variant,)+];

            /// Number of bind ids (size of the command state array).
            pub const COUNT: usize = Self::ALL.len();

            /// Wire token for this bind id.
            pub const fn token(self) -> &'static str {
                match self {
                    $(BindId::$variant => $token,)+
                }
            }
        }
    };
}

bind_ids! {
    FastForward => "FAST_FORWARD",
    FastForwardHold => "FAST_FORWARD_HOLD",
    SlowMotion => "SLOWMOTION",
    SlowMotionHold => "SLOWMOTION_HOLD",
    LoadState => "LOAD_STATE",
    SaveState => "SAVE_STATE",
    FullscreenToggle => "FULLSCREEN_TOGGLE",
    CloseContent => "CLOSE_CONTENT",
    Quit => "QUIT",
    StateSlotPlus => "STATE_SLOT_PLUS",
    StateSlotMinus => "STATE_SLOT_MINUS",
    Rewind => "REWIND",
    BsvRecordToggle => "BSV_RECORD_TOGGLE",
    PauseToggle => "PAUSE_TOGGLE",
    FrameAdvance => "FRAMEADVANCE",
    Reset => "RESET",
    ShaderNext => "SHADER_NEXT",
    ShaderPrev => "SHADER_PREV",
    CheatIndexPlus => "CHEAT_INDEX_PLUS",
    CheatIndexMinus => "CHEAT_INDEX_MINUS",
    CheatToggle => "CHEAT_TOGGLE",
    Screenshot => "SCREENSHOT",
    Mute => "MUTE",
    OsdToggle => "OSD_TOGGLE",
    NetplayFlip => "NETPLAY_FLIP",
    NetplayGameWatch => "NETPLAY_GAME_WATCH",
    NetplayHostToggle => "NETPLAY_HOST_TOGGLE",
    VolumeUp => "VOLUME_UP",
    VolumeDown => "VOLUME_DOWN",
    OverlayNext => "OVERLAY_NEXT",
    DiskEjectToggle => "DISK_EJECT_TOGGLE",
    DiskNext => "DISK_NEXT",
    DiskPrev => "DISK_PREV",
    GrabMouseToggle => "GRAB_MOUSE_TOGGLE",
    GameFocusToggle => "GAME_FOCUS_TOGGLE",
    MenuToggle => "MENU_TOGGLE",
    RecordingToggle => "RECORDING_TOGGLE",
    StreamingToggle => "STREAMING_TOGGLE",
    UndoLoadState => "UNDO_LOAD_STATE",
    UndoSaveState => "UNDO_SAVE_STATE",
    MenuUp => "MENU_UP",
    MenuDown => "MENU_DOWN",
    MenuLeft => "MENU_LEFT",
    MenuRight => "MENU_RIGHT",
    MenuA => "MENU_A",
    MenuB => "MENU_B",
}

impl BindId {
    /// Index of this bind id in the command state array.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a bind id by raw index; out-of-range indices yield `None`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Exact-match lookup of a wire token.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.token() == token)
    }

    /// Hold binds act for as long as they are asserted instead of firing once
    /// on the rising edge.
    pub const fn is_hold(self) -> bool {
        matches!(
            self,
            BindId::FastForwardHold | BindId::SlowMotionHold | BindId::Rewind
        )
    }
}

impl std::fmt::Display for BindId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}
