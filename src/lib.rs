//! Decide whether interactively typed C/C++ input is complete, still open, or
//! structurally broken, by balancing brackets and preprocessor conditionals over
//! a token stream.

pub mod config;
pub mod error;
pub mod highlight;
pub mod session;
pub mod tokenizer;
pub mod types;
pub mod validator;

pub use error::ValidatorError;
pub use session::{Outcome, Session};
pub use tokenizer::{SourceLexer, Token, TokenKind, Tokenizer};
pub use types::{BalanceStack, Opener, Verdict};
pub use validator::InputValidator;
