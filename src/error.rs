use crate::boxes::FourCC;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid atom size {size} at offset {offset}")]
    InvalidSize { offset: u64, size: u64 },
    #[error("64-bit atom size at offset {offset} is not supported")]
    ExtendedSize { offset: u64 },
    #[error("'{0}' payload is shorter than its fixed fields")]
    Truncated(FourCC),
    #[error("writing '{0}' atoms is not supported")]
    Unsupported(FourCC),
    #[error("'{typ}' declares {declared} bytes but {written} were written")]
    SizeMismatch {
        typ: FourCC,
        declared: u64,
        written: u64,
    },
    #[error("invalid integer size {0}")]
    InvalidIntegerSize(u64),
    #[error("type handler: {0}")]
    Handler(anyhow::Error),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        // handlers usually just forward a nested parse error with `?`
        match err.downcast::<Error>() {
            Ok(inner) => inner,
            Err(other) => Error::Handler(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
