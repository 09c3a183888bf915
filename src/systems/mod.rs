//! Player systems.
//!
//! This module groups all ECS systems run by the
//! [`Ticker`](crate::ticker::Ticker) each tick.
//!
//! Submodules overview
//! - [`frameloader`] – bridge with the loader thread and fold load results into sections
//! - [`loading`] – drive the application loading phase
//! - [`scrollsequence`] – map scroll position to the displayed frame of each section
//! - [`time`] – update simulation time and delta

pub mod frameloader;
pub mod loading;
pub mod scrollsequence;
pub mod time;
