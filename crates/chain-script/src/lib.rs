//! Stack-machine Script interpreter and sighash construction for the chain
//! engine core (component C3).

pub mod error;
pub mod interpreter;
pub mod number;
pub mod sighash;

pub use error::ScriptError;
pub use interpreter::eval_script;
pub use number::{cast_to_bool, decode_num, encode_num};
pub use sighash::sighash_message;
