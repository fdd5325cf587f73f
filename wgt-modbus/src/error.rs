use std::time::Duration;

/// Everything that can go wrong while talking to a WGT unit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The TCP handshake with the device failed.
    #[error("failed to connect to {endpoint}: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// A short or failed read or write, including a peer closing mid-frame.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The per-call deadline fired. The connection has been torn down.
    #[error("{operation} did not complete within {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// The device answered with a frame that does not match the request.
    #[error("{0}")]
    Protocol(String),

    #[error("all transaction ids are outstanding")]
    TransactionIdsExhausted,

    #[error("{name} {value} is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown {kind} label {label:?}")]
    UnknownLabel { kind: &'static str, label: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yml::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Check that `value` lies in `min..=max`.
    pub(crate) fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                name,
                value,
                min,
                max,
            })
        }
    }
}
