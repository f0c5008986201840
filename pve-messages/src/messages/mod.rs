//! Central registry for all user-facing message templates.
//!
//! - `snapshot` - snapshot query and cluster lookup messages
//! - `config` - connection settings and parameter validation messages
//!
//! ```rust
//! use pve_messages::MESSAGES;
//!
//! let msg = MESSAGES.snapshot.vmid_unresolved;
//! let msg = MESSAGES.config.token_pair_incomplete;
//! ```

mod config;
mod snapshot;

pub use config::{ConfigMessages, CONFIG_MESSAGES};
pub use snapshot::{SnapshotMessages, SNAPSHOT_MESSAGES};

pub struct Messages {
    pub snapshot: SnapshotMessages,
    pub config: ConfigMessages,
}

pub const MESSAGES: Messages = Messages {
    snapshot: SNAPSHOT_MESSAGES,
    config: CONFIG_MESSAGES,
};
