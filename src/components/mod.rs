//! ECS components for animated sections.
//!
//! Every animated section of the page is one entity carrying the three
//! components below.
//!
//! Submodules overview:
//! - [`frameimage`] – the frame a renderer should display, and whether it may be shown
//! - [`scrollcontainer`] – where the section sits on the page (document coordinates)
//! - [`scrollsequence`] – sequence configuration and playback state

pub mod frameimage;
pub mod scrollcontainer;
pub mod scrollsequence;
