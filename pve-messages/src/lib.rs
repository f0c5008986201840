//! pve-messages
//!
//! Centralized message templates for the snapshot query module, plus the
//! `msg!` builder used to fill `{placeholder}` variables.

pub mod builder;
pub mod macros;
pub mod messages;

pub use messages::MESSAGES;
