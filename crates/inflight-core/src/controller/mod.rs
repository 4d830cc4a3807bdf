//! Admission controller bounding the in-flight asynchronous operations of a worker.
//!
//! - [`AdmissionController`] owns the pending set and the wake primitive.
//! - [`OperationId`] is the identity of a tracked operation, [`OperationKey`] its label.
mod admission;
pub use admission::AdmissionController;

mod key;
pub use key::{OperationId, OperationKey};

mod pending;
pub use pending::PendingOperation;
