//! Event and message types exchanged between systems.
//!
//! Messages (`FrameLoadRequest`, `FrameLoadResult`) are queued and drained
//! once per tick; events are triggered immediately and delivered to
//! observers.
//!
//! Submodules:
//! - [`frameload`] – load requests/results exchanged with the loader thread
//! - [`loading`] – end of the application loading phase
//! - [`sequence`] – frame changes and first-frame reveal of a section
//! - [`switchdebug`] – toggle diagnostics on/off
pub mod frameload;
pub mod loading;
pub mod sequence;
pub mod switchdebug;
