//! Concrete F2L categories.
//!
//! | Category       | Versions  | Channel    | Capabilities                     |
//! |----------------|-----------|------------|----------------------------------|
//! | [`GameControl`] | 1.0, 1.1 | Foundation | transactional, negotiable        |
//! | [`Connect`]     | 1.0      | Foundation | negotiates the others            |
//! | [`AutoPlay`]    | 1.0, 1.1 | Foundation | negotiable                       |
//! | [`VoucherPrint`]| 1.0      | Foundation | inbound only                     |
//! | [`WapSign`]     | 1.0      | Game       | outbound only                    |
//!
//! Each category is generic over the [`Transport`](f2l_category::Transport)
//! it talks over and takes its callbacks as a trait object. Constructors
//! register inbound routes, so a category is live as soon as `new` returns.

pub mod auto_play;
pub mod connect;
pub mod game_control;
pub mod messages;
pub mod voucher_print;
pub mod wap_sign;

pub use auto_play::{AutoPlay, AutoPlayCallbacks};
pub use connect::{Connect, ConnectCallbacks};
pub use game_control::{GameControl, GameControlCallbacks};
pub use voucher_print::{VoucherPrint, VoucherPrintCallbacks};
pub use wap_sign::WapSign;

/// Status code sent back when a callback refuses an inbound request.
pub const CALLBACK_REFUSED: i32 = 1;

/// Maps a callback's verdict onto a reply status code and description.
pub(crate) fn reply_code(result: Result<(), String>) -> (i32, String) {
    match result {
        Ok(()) => (0, String::new()),
        Err(reason) => {
            tracing::debug!(%reason, "callback refused request");
            (CALLBACK_REFUSED, reason)
        }
    }
}
