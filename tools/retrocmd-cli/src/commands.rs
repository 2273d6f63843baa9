//! Commands listing

use retrocmd_shared::{ACTIONS, BindId};

pub fn execute() {
    println!("Actions:");
    for spec in ACTIONS {
        println!("  {:<20} {}", spec.token, spec.arg_hint);
    }
    println!();
    println!("Binds (held for one poll):");
    for id in BindId::ALL {
        println!("  {id}");
    }
}
