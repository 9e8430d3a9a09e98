pub mod creation;
pub mod operation;
pub mod response;
pub mod subscriber;

pub use creation::{Creation, NewCreation};
pub use operation::{Access, CreationKind, OperationClass};
pub use response::{ApiResponse, CreationsResponse};
pub use subscriber::{Subscriber, Tier};
