// SPDX-License-Identifier: MPL-2.0
//! Plain value types shared by every layer. Nothing here touches a device,
//! the network or the terminal.
//!
//! - [`session`]: [`Facing`](session::Facing), [`SessionPhase`](session::SessionPhase)
//!   and the [`ErrorInfo`](session::ErrorInfo) shown to the user
//! - [`media`]: frames, stream ids and clamped capture settings
//! - [`diagnostics`]: the bounded event buffer size

pub mod diagnostics;
pub mod media;
pub mod session;
