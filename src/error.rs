//! Failure classes of the reporting core.
//!
//! None of these is fatal to the process. Every one of them ends the current
//! report or notification attempt and is retried by the caller's next
//! periodic call.

use crate::network::error::Error as NetworkError;

/// Why a status report was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportError {
    /// No usable link: the attempt timed out, or was skipped by the cooldown
    /// or because one was already running.
    LinkUnavailable,
    /// Persisted counters are not restored yet.
    DataNotReady,
    /// The request could not be sent or no response was read.
    TransportFailure(NetworkError),
    /// The backend answered but did not acknowledge the report.
    BackendRejected {
        /// HTTP status of the answer.
        status: u16,
    },
    /// The secure transport client could not be constructed.
    AllocationFailure,
    /// The payload did not fit its fixed-size buffer.
    EncodeFailure,
}

impl From<NetworkError> for ReportError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::OutOfMemory => ReportError::AllocationFailure,
            other => ReportError::TransportFailure(other),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ReportError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ReportError::LinkUnavailable => defmt::write!(f, "LinkUnavailable"),
            ReportError::DataNotReady => defmt::write!(f, "DataNotReady"),
            ReportError::TransportFailure(e) => defmt::write!(f, "TransportFailure({})", e),
            ReportError::BackendRejected { status } => {
                defmt::write!(f, "BackendRejected({=u16})", status)
            }
            ReportError::AllocationFailure => defmt::write!(f, "AllocationFailure"),
            ReportError::EncodeFailure => defmt::write!(f, "EncodeFailure"),
        }
    }
}
