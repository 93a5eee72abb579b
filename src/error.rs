use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input contains no symbols")]
    EmptyInput,

    #[error("symbol at position {index} has no code in the table")]
    UnknownSymbol { index: usize },

    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    #[error("code table of {0} bytes does not fit the archive length field")]
    TableTooLarge(usize),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid archive: {0}")]
    Archive(#[from] rmp_serde::decode::Error),

    #[error("failed to serialize archive: {0}")]
    ArchiveWrite(#[from] rmp_serde::encode::Error),
}

impl Error {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Error::CorruptStream(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
