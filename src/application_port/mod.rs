mod authority;
mod token_codec;

pub use authority::*;
pub use token_codec::*;
