pub mod assistant;
pub mod config;
pub mod context;
pub mod decode;
pub mod error;
pub mod knowledge;
pub mod prompt;
pub mod retry;

pub use assistant::*;
pub use config::*;
pub use context::*;
pub use decode::*;
pub use error::*;
pub use knowledge::*;
pub use prompt::*;
pub use retry::*;
