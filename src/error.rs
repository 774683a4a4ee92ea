use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RevtransError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("the given file is not a Revelation password file")]
    InvalidMagic,

    #[error("incompatible Revelation file version {0}")]
    IncompatibleVersion(u8),

    #[error("key derivation for Revelation file version {0} is not supported")]
    UnsupportedKeyDerivation(u8),

    #[error("passphrase is {len} bytes long, at most 32 bytes are supported")]
    PassphraseTooLong { len: usize },

    #[error("cipher failure: {0}")]
    Crypto(String),

    #[error("invalid padding length {padding} for {len} decrypted bytes. Wrong password?")]
    InvalidPadding { padding: usize, len: usize },

    #[error("the Revelation file could not be decrypted/decompressed correctly. Wrong password?")]
    Decompression(#[source] std::io::Error),

    #[error("the Revelation document seems to be invalid: {0}")]
    MalformedDocument(String),

    #[error("untyped entry detected in: {path}")]
    MissingType { path: String },

    #[error("{node} without name detected in: {path}")]
    MissingName { node: &'static str, path: String },

    #[error("entry without update timestamp detected: {path}")]
    MissingTimestamp { path: String },

    #[error("entry with invalid update timestamp {value:?} detected: {path}")]
    InvalidTimestamp { path: String, value: String },

    #[error("untyped field detected in: {path}")]
    MissingFieldId { path: String },

    #[error("output {0} already exists")]
    AlreadyExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, RevtransError>;
