// SPDX-License-Identifier: MPL-2.0
//! User-facing feedback shared by front ends.
//!
//! - [`notifications`] - Queued, auto-dismissing user notifications

pub mod notifications;
