//! Business logic services for the application layer.

pub mod admission_service;
pub mod allocator;
pub mod deadlines;
pub mod link_service;
pub mod read_through;

pub use admission_service::{AdmissionScope, AdmissionService};
pub use allocator::{IdAllocator, MAX_ATTEMPTS};
pub use deadlines::Deadlines;
pub use link_service::LinkService;
pub use read_through::ReadThroughCache;
