mod contact;
mod customer;
mod events;
mod invoice;
mod journal;
mod listing;
mod money;

pub use contact::*;
pub use customer::*;
pub use events::*;
pub use invoice::*;
pub use journal::*;
pub use listing::*;
pub use money::*;
