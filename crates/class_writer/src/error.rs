use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassWriterError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Constant pool too large: {0} slots (max 65535)")]
    ConstantPoolTooLarge(usize),
    #[error("UTF8 constant too long: {0} bytes (max 65535)")]
    Utf8TooLong(usize),
    #[error("Invalid type path: {0:?}")]
    InvalidTypePath(String),
    #[error("Class name and version were never visited")]
    MissingClassName,
    #[error("Size mismatch: computed {computed} bytes, wrote {written}")]
    SizeMismatch { computed: usize, written: usize },
}
