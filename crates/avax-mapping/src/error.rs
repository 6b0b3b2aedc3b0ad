use thiserror::Error;

/// Precondition failures raised by the domain handlers.
///
/// These mean decoding upstream failed or the ABI did not match, and are
/// fatal to the handler invocation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MappingError {
    #[error("Event Args not parsed")]
    EventArgsNotParsed,
    #[error("Call Args not parsed")]
    CallArgsNotParsed,
}
