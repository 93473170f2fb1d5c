// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod catalog;
pub mod profile;
pub mod story;

pub use profile::{Profile, ProfilePatch};
pub use story::{GeneratedStory, Story};
