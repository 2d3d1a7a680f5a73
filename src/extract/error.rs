use thiserror::Error;

/// Failure modes of the extraction/injection surface. None of these are
/// fatal: the command layer turns them into user-facing alert strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("this page is not a supported chat platform")]
    UnsupportedPage,

    #[error("no conversation messages found on this page")]
    NoMessages,

    #[error("could not find the chat input field - make sure you are in a chat")]
    InputNotFound,

    #[error("chat interface did not appear after {attempts} checks")]
    WaitTimeout { attempts: u32 },
}
