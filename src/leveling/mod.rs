pub mod cache;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod level;
pub mod locks;
pub mod message;
pub mod voice;

pub use error::{LevelingError, LevelingResult, ValidationError};
pub use ledger::{Ledger, XpChange};
