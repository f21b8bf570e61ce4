// Shell module
//
// This module contains the interactive console front end for the ledger

pub mod menu;
pub mod render;
pub mod session;

// Re-export main components for easier access
pub use session::Shell;
