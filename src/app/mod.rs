//! Demo host: scene construction, input handling and per-frame state.

pub mod event;
pub mod handler;
pub mod keys;
pub mod scene;
pub mod state;
