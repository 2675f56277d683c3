//! Command-line tools for mailtally.
//!
//! - `mailtally-extract`: read receipt emails and print their totals
//!
//! # Example Usage
//!
//! ```bash
//! mailtally-extract receipt.txt --currency EUR
//! mailtally-extract *.txt --format json
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
