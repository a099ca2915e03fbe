// engine module: notification sync engine

mod interface;
mod refresh;
mod state;
pub mod stub;
mod sync;

pub use interface::{Engine, EngineHandle, Event, Request};
pub use refresh::PollTimer;
pub use state::{Sequencer, Snapshot, SyncState};
pub use stub::{StubBackend, StubCalls};
pub use sync::{EngineSettings, SyncEngine};
