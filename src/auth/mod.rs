mod gate;
mod session;
pub mod storage;

pub use gate::*;
pub use session::*;
pub use storage::*;
