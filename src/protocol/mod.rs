// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

pub mod messages;
pub mod parser;
pub mod response;

pub use messages::Command;
pub use parser::Parser;
pub use response::{Report, ResponseFrame, RESPONSE_LEN};
