//! Line batch parsing

use retrocmd_shared::{Resolved, resolve};

use super::ActionHandler;
use super::reply::ReplySink;
use super::state::CommandState;

/// Split `text` on `\n` and apply each line in order.
///
/// Bind tokens set their flag in `state`; actions run immediately through
/// `handler` with `reply` as their output. Unknown lines are logged and
/// skipped. Returns the number of recognized lines.
pub fn process_batch(
    text: &str,
    state: &mut CommandState,
    handler: &mut dyn ActionHandler,
    reply: &mut dyn ReplySink,
) -> usize {
    let mut recognized = 0;
    for line in text.split('\n').filter(|line| !line.is_empty()) {
        match resolve(line) {
            Resolved::Bind(id) => {
                tracing::debug!(command = %id, "bind asserted");
                state.set(id);
            }
            Resolved::Action { id, arg } => {
                tracing::debug!(action = id.token(), ?arg, "action");
                if !handler.handle_action(id, arg, reply) {
                    tracing::debug!(action = id.token(), "action reported failure");
                }
            }
            Resolved::Unrecognized => {
                tracing::warn!(line, "unrecognized command");
                continue;
            }
        }
        recognized += 1;
    }
    recognized
}
