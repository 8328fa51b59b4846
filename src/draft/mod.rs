// Draft core: snake order generation, the turn engine, the pick log, and
// the exclusive-ownership roster store.

pub mod engine;
pub mod order;
pub mod pick;
pub mod roster;
pub mod timer;

use serde::{Deserialize, Serialize};

/// A league member taking part in the draft.
///
/// Identity is immutable for the league's lifetime; only the ready flag
/// toggles, and only before the draft starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    pub ready: bool,
}

impl Participant {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Participant {
            id: id.into(),
            display_name: display_name.into(),
            ready: false,
        }
    }
}
