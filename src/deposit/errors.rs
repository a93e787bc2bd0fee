//! Errors returned by deposit operations.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositError {
    NotInitialized,
    InvalidLevel { requested: u32, current: u32, max: u32 },
}

impl fmt::Display for DepositError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "deposit has no definition"),
            Self::InvalidLevel {
                requested,
                current,
                max,
            } => write!(
                f,
                "cannot move from level {} to level {} (max {})",
                current, requested, max
            ),
        }
    }
}

impl std::error::Error for DepositError {}
