// SPDX-License-Identifier: MPL-2.0
//! Session orchestration over pluggable collaborators.
//!
//! [`port`] declares what the session needs from the outside world: a camera,
//! a frame capturer, an upload client and a gallery search. [`session`]
//! drives the camera lifecycle on top of those traits, and [`query`] pages
//! through uploaded photos. Implementations live in `infrastructure` and
//! `test_utils`.

pub mod port;
pub mod query;
pub mod session;
