//! The static command table and token resolution.
//!
//! A command line is either a bare bind token (`FAST_FORWARD`) or an action
//! token optionally followed by a space and an argument string
//! (`SET_SHADER /path/to/preset.slangp`).

use crate::ids::BindId;

/// Entry of the action table.
#[derive(Debug, Clone, Copy)]
pub struct ActionSpec {
    pub id: ActionId,
    pub token: &'static str,
    /// Human readable argument description, shown by `--help` style listings.
    pub arg_hint: &'static str,
    /// Whether the action receives an argument string.
    pub takes_arg: bool,
}

macro_rules! action_ids {
    ($($variant:ident => $token:literal, $hint:literal, takes_arg: $takes:literal;)+) => {
        /// Named action that performs an immediate side effect or reply.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ActionId {
            $($variant,)+
        }

        /// Every action, in matching order.
        pub const ACTIONS: &[ActionSpec] = &[
            $(ActionSpec { id: ActionId::$variant, token: $token, arg_hint: $hint, takes_arg: $takes },)+
        ];

        impl ActionId {
            /// Table entry for this action.
            pub const fn spec(self) -> &'static ActionSpec {
                match self {
                    $(ActionId::$variant => &ActionSpec {
                        id: ActionId::$variant,
                        token: $token,
                        arg_hint: $hint,
                        takes_arg: $takes,
                    },)+
                }
            }
        }
    };
}

action_ids! {
    SetShader => "SET_SHADER", "<shader path>", takes_arg: true;
    Version => "VERSION", "No argument", takes_arg: false;
    GetStatus => "GET_STATUS", "No argument", takes_arg: false;
    GetConfigParam => "GET_CONFIG_PARAM", "<param name>", takes_arg: true;
    ShowMsg => "SHOW_MSG", "<message>", takes_arg: true;
    LoadStateSlot => "LOAD_STATE_SLOT", "<slot number>", takes_arg: true;
    SaveStateSlot => "SAVE_STATE_SLOT", "<slot number>", takes_arg: true;
    ReadCoreRam => "READ_CORE_RAM", "<address> <number of bytes>", takes_arg: true;
    WriteCoreRam => "WRITE_CORE_RAM", "<address> <byte1> <byte2> ...", takes_arg: true;
    ReadCoreMemory => "READ_CORE_MEMORY", "<address> <number of bytes>", takes_arg: true;
    WriteCoreMemory => "WRITE_CORE_MEMORY", "<address> <byte1> <byte2> ...", takes_arg: true;
}

impl ActionId {
    /// Wire token for this action.
    pub const fn token(self) -> &'static str {
        self.spec().token
    }
}

/// Result of resolving one command line against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a> {
    Bind(BindId),
    Action {
        id: ActionId,
        /// `None` for actions without arguments, otherwise the text after the
        /// separating space (empty if there was none).
        arg: Option<&'a str>,
    },
    Unrecognized,
}

/// Resolve a single line.
///
/// Bind tokens match exactly. Action tokens match as a prefix that must be
/// followed by a space or the end of the line, so `VERSIONX` is not `VERSION`.
pub fn resolve(line: &str) -> Resolved<'_> {
    if let Some(id) = BindId::from_token(line) {
        return Resolved::Bind(id);
    }

    for spec in ACTIONS {
        let Some(rest) = line.strip_prefix(spec.token) else {
            continue;
        };

        let arg = if rest.is_empty() {
            ""
        } else if let Some(arg) = rest.strip_prefix(' ') {
            arg
        } else {
            continue;
        };

        return Resolved::Action {
            id: spec.id,
            arg: spec.takes_arg.then_some(arg),
        };
    }

    Resolved::Unrecognized
}

/// Returns true if `line` resolves to a bind id or an action.
pub fn is_known_command(line: &str) -> bool {
    !matches!(resolve(line), Resolved::Unrecognized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_has_a_table_entry() {
        for spec in ACTIONS {
            let entry = spec.id.spec();
            assert_eq!(entry.id, spec.id);
            assert_eq!(entry.token, spec.token);
            assert_eq!(entry.arg_hint, spec.arg_hint);
            assert_eq!(entry.takes_arg, spec.takes_arg);
        }
        assert_eq!(ActionId::ReadCoreRam.token(), "READ_CORE_RAM");
        assert!(!ActionId::Version.spec().takes_arg);
    }

    #[test]
    fn bind_tokens_resolve_exactly() {
        for id in BindId::ALL {
            assert_eq!(resolve(id.token()), Resolved::Bind(*id));
        }
    }

    #[test]
    fn action_with_argument() {
        assert_eq!(
            resolve("SET_SHADER /tmp/crt shader.slangp"),
            Resolved::Action {
                id: ActionId::SetShader,
                arg: Some("/tmp/crt shader.slangp"),
            }
        );
    }

    #[test]
    fn action_argument_whitespace_is_preserved() {
        assert_eq!(
            resolve("SHOW_MSG   spaced  out "),
            Resolved::Action {
                id: ActionId::ShowMsg,
                arg: Some("  spaced  out "),
            }
        );
    }

    #[test]
    fn action_without_separator_gets_empty_argument() {
        assert_eq!(
            resolve("SET_SHADER"),
            Resolved::Action {
                id: ActionId::SetShader,
                arg: Some(""),
            }
        );
    }

    #[test]
    fn argumentless_action_ignores_trailing_text() {
        assert_eq!(
            resolve("VERSION please"),
            Resolved::Action {
                id: ActionId::Version,
                arg: None,
            }
        );
        assert_eq!(
            resolve("VERSION"),
            Resolved::Action {
                id: ActionId::Version,
                arg: None,
            }
        );
    }

    #[test]
    fn prefix_requires_boundary() {
        assert_eq!(resolve("VERSIONX"), Resolved::Unrecognized);
        assert_eq!(resolve("READ_CORE_RAMBLE 10"), Resolved::Unrecognized);
    }

    #[test]
    fn unknown_tokens() {
        assert_eq!(resolve("NOT_A_COMMAND"), Resolved::Unrecognized);
        assert_eq!(resolve(""), Resolved::Unrecognized);
        assert_eq!(resolve("fast_forward"), Resolved::Unrecognized);
        assert!(!is_known_command("BOGUS"));
        assert!(is_known_command("QUIT"));
    }
}
