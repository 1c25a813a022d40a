//! Contains my Error type.


/// Uses my custom error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Custom error type.
#[derive(Debug)]
pub enum Error {

    /// Missing or invalid sample rate, or conflicting flags.
    Config(String),

    /// Input/output: open failure, or a short read that is not a clean EOF.
    Io(std::io::Error),

    /// Telemetry frame not found within the recorded height.
    Detection(String),

    /// `high == low`, or an empty wedge vector, during normalization.
    Numeric(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Error::Config(ref msg) => f.write_str(msg.as_str()),
            Error::Io(ref err) => err.fmt(f),
            Error::Detection(ref msg) => f.write_str(msg.as_str()),
            Error::Numeric(ref msg) => f.write_str(msg.as_str()),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Error::Config(err.to_string())
    }
}
