// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Story model for the local cache and the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of magic words per story.
pub const WORD_COUNT: usize = 5;

/// A generated story as stored locally and mirrored remotely.
///
/// Stories are immutable after creation; `is_last_generated` is the
/// only field that changes, and only as a derived flag maintained by
/// the history reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Unique id: time-derived locally, server-assigned once mirrored
    pub id: String,
    pub title: String,
    pub content: String,
    /// Illustration URL (remote generation output or durable storage)
    #[serde(default)]
    pub image_url: String,
    /// Exactly the 5 input words
    #[serde(default)]
    pub words: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// True only for the most recent story in the ordered history;
    /// grants one free read to non-subscribers
    #[serde(default)]
    pub is_last_generated: bool,
}

impl Story {
    /// Build a freshly generated story with a time-derived id.
    pub fn from_generated(generated: GeneratedStory, words: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: now.timestamp_millis().to_string(),
            title: generated.title,
            content: generated.content,
            image_url: generated.illustration,
            words,
            created_at: now,
            is_last_generated: false,
        }
    }
}

/// Raw story-generation service response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedStory {
    pub title: String,
    pub content: String,
    /// URL of the generated illustration on the generation backend
    #[serde(default)]
    pub illustration: String,
}
