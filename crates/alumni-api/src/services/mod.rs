//! Explicitly constructed service objects, one per entity. Each owns a
//! handle to the store and is shared through `AppState`.

mod majors;
mod messages;
mod opportunities;
mod users;

pub use majors::MajorService;
pub use messages::MessageService;
pub use opportunities::{OpportunityApprovals, OpportunityService};
pub use users::{UserApprovals, UserError, UserService};
