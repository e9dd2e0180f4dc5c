//! Wire bodies, one module per category.
//!
//! Request bodies of transactional operations carry a `transaction_id`
//! field; every reply carries a `status`.

pub mod auto_play;
pub mod connect;
pub mod game_control;
pub mod voucher_print;
pub mod wap_sign;
