//! Named actions received over the command transports

use std::fmt::Write as _;
use std::path::PathBuf;

use retrocmd_shared::{ActionId, MAX_MEMORY_REQUEST};
use smallvec::SmallVec;

use super::EventCommand as E;
use super::Dispatcher;
use crate::command::{ActionHandler, ReplySink};

/// Bytes parsed from a write command; most writes are a handful of bytes.
type WriteBytes = SmallVec<[u8; 16]>;

impl ActionHandler for Dispatcher {
    fn handle_action(
        &mut self,
        action: ActionId,
        arg: Option<&str>,
        reply: &mut dyn ReplySink,
    ) -> bool {
        let arg = arg.unwrap_or_default();
        match action {
            ActionId::SetShader => {
                if arg.is_empty() {
                    tracing::warn!("SET_SHADER without a path");
                    return false;
                }
                self.execute(E::SetShader(PathBuf::from(arg)))
            }
            ActionId::Version => {
                reply.reply(format!("{}\n", self.version).as_bytes());
                true
            }
            ActionId::GetStatus => {
                reply.reply(self.status_line().as_bytes());
                true
            }
            ActionId::GetConfigParam => self.get_config_param(arg, reply),
            ActionId::ShowMsg => {
                if arg.is_empty() {
                    return false;
                }
                self.notify(arg);
                true
            }
            ActionId::LoadStateSlot => match parse_slot(arg) {
                Some(slot) => {
                    if let Some(reason) = self.load_refusal() {
                        tracing::warn!(slot, "load state refused: {reason}");
                        return false;
                    }
                    self.states_ready() && self.set_state_slot(slot) && self.execute(E::LoadState)
                }
                None => false,
            },
            ActionId::SaveStateSlot => match parse_slot(arg) {
                Some(slot) => {
                    self.set_state_slot(slot) && self.states_ready() && self.save_state_to_slot(slot)
                }
                None => false,
            },
            ActionId::ReadCoreRam => self.read_core_ram(arg, reply),
            ActionId::WriteCoreRam => self.write_core_ram(arg),
            ActionId::ReadCoreMemory => self.read_core_memory(arg, reply),
            ActionId::WriteCoreMemory => self.write_core_memory(arg, reply),
        }
    }
}

impl Dispatcher {
    fn states_ready(&self) -> bool {
        self.state.content_loaded() && self.services.core.serialize_size() > 0
    }

    /// `GET_STATUS` reply.
    fn status_line(&self) -> String {
        let info = self.services.core.content();
        match info {
            Some(info) if self.state.content_loaded() => format!(
                "GET_STATUS {} {},{},crc32={:x}\n",
                if self.state.paused { "PAUSED" } else { "PLAYING" },
                info.system_id,
                info.name,
                info.crc32
            ),
            _ => "GET_STATUS CONTENTLESS\n".to_string(),
        }
    }

    fn get_config_param(&self, name: &str, reply: &mut dyn ReplySink) -> bool {
        let name = name.trim();
        if name.is_empty() {
            tracing::warn!("GET_CONFIG_PARAM without a name");
            return false;
        }
        match self.config.param(name) {
            Some(value) => {
                reply.reply(format!("GET_CONFIG_PARAM {name} {value}\n").as_bytes());
                true
            }
            None => {
                tracing::warn!(name, "unknown config parameter");
                reply.reply(format!("GET_CONFIG_PARAM {name} unsupported\n").as_bytes());
                false
            }
        }
    }

    fn read_core_ram(&mut self, arg: &str, reply: &mut dyn ReplySink) -> bool {
        let Some((address, count)) = parse_read_request(arg) else {
            tracing::warn!(arg, "malformed READ_CORE_RAM request");
            return false;
        };

        let data = if (1..=MAX_MEMORY_REQUEST).contains(&count) {
            let mut data = vec![0u8; count];
            self.services
                .core
                .memory()
                .is_some_and(|memory| memory.read_ram(address, &mut data))
                .then_some(data)
        } else {
            None
        };

        let line = match &data {
            Some(data) => format!("READ_CORE_RAM {address:x}{}\n", hex_bytes(data)),
            None => {
                tracing::warn!(address, count, "READ_CORE_RAM request not satisfiable");
                format!("READ_CORE_RAM {address:x} -1\n")
            }
        };
        reply.reply(line.as_bytes());
        data.is_some()
    }

    fn write_core_ram(&mut self, arg: &str) -> bool {
        if self.config.achievements.hardcore_mode {
            tracing::warn!("WRITE_CORE_RAM refused in hardcore mode");
            return false;
        }
        let Some((address, bytes)) = parse_write_request(arg) else {
            tracing::warn!(arg, "malformed WRITE_CORE_RAM request");
            return false;
        };
        let written = self
            .services
            .core
            .memory()
            .is_some_and(|memory| memory.write_ram(address, &bytes));
        if !written {
            tracing::warn!(address, len = bytes.len(), "WRITE_CORE_RAM out of range");
        }
        written
    }

    fn read_core_memory(&mut self, arg: &str, reply: &mut dyn ReplySink) -> bool {
        let Some((address, count)) = parse_read_request(arg) else {
            tracing::warn!(arg, "malformed READ_CORE_MEMORY request");
            return false;
        };

        let result = if !(1..=MAX_MEMORY_REQUEST).contains(&count) {
            Err("invalid size".to_string())
        } else {
            let mut data = vec![0u8; count];
            match self.services.core.memory() {
                Some(memory) => memory
                    .read(address, &mut data)
                    .map(|()| data)
                    .map_err(|e| e.to_string()),
                None => Err("no memory map defined".to_string()),
            }
        };

        let (line, ok) = match result {
            Ok(data) => (
                format!("READ_CORE_MEMORY {address:x}{}\n", hex_bytes(&data)),
                true,
            ),
            Err(reason) => (format!("READ_CORE_MEMORY {address:x} -1 {reason}\n"), false),
        };
        reply.reply(line.as_bytes());
        ok
    }

    fn write_core_memory(&mut self, arg: &str, reply: &mut dyn ReplySink) -> bool {
        let Some((address, bytes)) = parse_write_request(arg) else {
            tracing::warn!(arg, "malformed WRITE_CORE_MEMORY request");
            return false;
        };

        let result = if self.config.achievements.hardcore_mode {
            Err("hardcore mode active".to_string())
        } else {
            match self.services.core.memory() {
                Some(memory) => memory.write(address, &bytes).map_err(|e| e.to_string()),
                None => Err("no memory map defined".to_string()),
            }
        };

        let (line, ok) = match result {
            Ok(written) => (format!("WRITE_CORE_MEMORY {address:x} {written}\n"), true),
            Err(reason) => (format!("WRITE_CORE_MEMORY {address:x} -1 {reason}\n"), false),
        };
        reply.reply(line.as_bytes());
        ok
    }
}

fn parse_slot(arg: &str) -> Option<i32> {
    match arg.trim().parse::<i32>() {
        Ok(slot) => Some(slot),
        Err(_) => {
            tracing::warn!(arg, "invalid state slot");
            None
        }
    }
}

/// Hex address with an optional `0x` prefix.
fn parse_address(token: &str) -> Option<u32> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u32::from_str_radix(digits, 16).ok()
}

/// `<hex address> <decimal count>`
fn parse_read_request(arg: &str) -> Option<(u32, usize)> {
    let mut tokens = arg.split_whitespace();
    let address = parse_address(tokens.next()?)?;
    let count = tokens.next()?.parse::<usize>().ok()?;
    Some((address, count))
}

/// `<hex address> <hex byte>...`, at least one byte.
fn parse_write_request(arg: &str) -> Option<(u32, WriteBytes)> {
    let mut tokens = arg.split_whitespace();
    let address = parse_address(tokens.next()?)?;
    let bytes = tokens
        .map(|token| u8::from_str_radix(token, 16).ok())
        .collect::<Option<WriteBytes>>()?;
    if bytes.is_empty() || bytes.len() > MAX_MEMORY_REQUEST {
        return None;
    }
    Some((address, bytes))
}

/// ` XX XX ..` with a leading space per byte.
fn hex_bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for byte in data {
        let _ = write!(out, " {byte:02X}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_request_parsing() {
        assert_eq!(parse_read_request("1000 4"), Some((0x1000, 4)));
        assert_eq!(parse_read_request("0xff  16"), Some((0xff, 16)));
        assert_eq!(parse_read_request("zz 4"), None);
        assert_eq!(parse_read_request("10"), None);
        assert_eq!(parse_read_request("10 -1"), None);
    }

    #[test]
    fn write_request_parsing() {
        let (address, bytes) = parse_write_request("7e0010 de ad 0F").unwrap();
        assert_eq!(address, 0x7e0010);
        assert_eq!(bytes.as_slice(), &[0xde, 0xad, 0x0f]);

        assert!(parse_write_request("10").is_none());
        assert!(parse_write_request("10 1ff").is_none());
        assert!(parse_write_request("10 gg").is_none());
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(hex_bytes(&[0xde, 0x01, 0xff]), " DE 01 FF");
        assert_eq!(hex_bytes(&[]), "");
    }
}
