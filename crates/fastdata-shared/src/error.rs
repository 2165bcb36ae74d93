use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Account id is empty")]
    Empty,

    #[error("Account name must be 2-64 characters before the first dot, got {0}")]
    NameLength(usize),

    #[error("Account name labels may only contain lowercase letters, digits, '_' and '-'")]
    InvalidCharacters,

    #[error("Implicit account must be 64 lowercase hex characters")]
    InvalidImplicit,

    #[error("Account id must end with a network suffix (.near, .testnet) or be a 64-char hex implicit account")]
    MissingSuffix,
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Borsh serialization failed: {0}")]
    Borsh(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KvError {
    #[error("Too many keys in one KV transaction (max {max})")]
    TooManyKeys { max: usize },
}
