//! Parsing: free-text date expressions and stored `SentTime` values.

pub mod date_expr;
pub mod sent_time;
