//! # UI State
//!
//! The tagged result every asynchronous boundary hands to a screen.
//!
//! ```text
//!   Idle ──► Loading ──┬──► Success(T)
//!                      └──► Failure(message)
//! ```
//!
//! A failure carries only user-visible text. Details go to the log.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum UiState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Failure(String),
}

impl<T> UiState<T> {
    /// Converts a finished operation, rendering the error with `Display`.
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => UiState::Success(value),
            Err(err) => UiState::Failure(err.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            UiState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            UiState::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> UiState<U> {
        match self {
            UiState::Idle => UiState::Idle,
            UiState::Loading => UiState::Loading,
            UiState::Success(value) => UiState::Success(f(value)),
            UiState::Failure(message) => UiState::Failure(message),
        }
    }
}
