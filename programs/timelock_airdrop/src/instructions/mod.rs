pub mod initialize;
pub mod fund;
pub mod claim;
pub mod withdraw;

pub use initialize::*;
pub use fund::*;
pub use claim::*;
pub use withdraw::*;
