//! Interactive catalog browsing over inline buttons.

mod state_machine;
mod token;

pub use state_machine::{
    BrowseError, BrowseState, BrowseStateMachine, BrowseView, ARCHIVE_BUTTON_LABEL,
    TRACKS_BUTTON_LABEL,
};
pub use token::{BrowseAction, CallbackToken, TokenError, MAX_TOKEN_BYTES, TOKEN_SEPARATOR};
