pub mod crop_rule;
pub mod forecast;
pub mod location;
pub mod message;
pub mod session;
pub mod verdict;

pub use crop_rule::*;
pub use forecast::*;
pub use location::*;
pub use message::*;
pub use session::*;
pub use verdict::*;
