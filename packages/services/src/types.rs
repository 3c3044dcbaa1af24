mod confirmation;
mod handle;
mod progress;
mod submission;

pub use confirmation::*;
pub use handle::*;
pub use progress::*;
pub use submission::*;
