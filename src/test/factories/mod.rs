mod generics;
mod members;

pub use generics::*;
pub use members::*;
