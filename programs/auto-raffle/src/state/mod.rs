pub use raffle::*;
pub use treasury::*;

pub mod raffle;
pub mod treasury;
