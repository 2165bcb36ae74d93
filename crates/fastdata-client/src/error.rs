use thiserror::Error;

use fastdata_shared::{AccountId, AccountIdError};
use fastdata_store::StoreError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Upload rejected: {0}")]
    Upload(#[from] UploadError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No account signed in")]
    NotSignedIn,

    #[error("Social graph task is no longer running")]
    ActorGone,
}

/// Why a follow/unfollow was refused before anything was sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter an account ID")]
    Empty,

    #[error("Invalid NEAR account format: {0}")]
    InvalidAccount(AccountIdError),

    #[error("You cannot follow yourself")]
    SelfTarget,

    #[error("Already following {0}")]
    AlreadyFollowing(AccountId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Sign-in failed: {0}")]
    SignInFailed(String),

    #[error("Sign-out failed: {0}")]
    SignOutFailed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("No files selected")]
    NoFiles,

    #[error("Too many files: {count} (max {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("File too large: {name} is {size} bytes (max {max})")]
    FileTooLarge { name: String, size: usize, max: usize },
}
