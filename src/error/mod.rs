//! Error wrapping subsystem.
//!
//! # Data Flow
//! ```text
//! caller code
//!     → wrapped.rs (wrap / wrap_with_context / wrap_with_context_and_stack)
//!         → frame.rs (capture caller location)
//!     → WrappedError (immutable, chains inner error)
//!     → fields.rs (flatten chain into Fields, nested under innerError)
//!     → logger facade
//! ```
//!
//! # Design Decisions
//! - Wrapping never fails; a missing frame simply omits location fields
//! - Inner errors are `Box<dyn Error + Send + Sync>` so any error can be wrapped
//! - The `Fielder` capability is detected by downcasting, with `Fielded` as
//!   the entry point for user types

pub mod ext;
pub mod fields;
pub mod frame;
pub mod wrapped;

pub use ext::ResultExt;
pub use fields::{error_fields, to_fields, Fielded, FieldedError, Fielder, Fields};
pub use frame::{capture_frame, Frame};
pub use wrapped::{wrap, wrap_with_context, wrap_with_context_and_stack, BoxError, WrappedError};
