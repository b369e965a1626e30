//! Ready-to-use diagnostic subscribers.
//!
//! These do not count anything. Attach them to an [`EventBus`](crate::EventBus)
//! to see the raw event stream while debugging a failing expectation.
//!
//! # Available Monitors
//!
//! - [`Tracer`] - Logs every event via `tracing` crate
//! - [`Recorder`] - Records events to a JSON Lines file (requires `recorder` feature)
//!
//! # Example
//!
//! ```ignore
//! use expect_io::{Subscribe, monitors::Tracer};
//!
//! let _tracing = bus.subscribe_scoped(Subscribe::all(), Tracer);
//! ```

mod tracer;
pub use tracer::Tracer;

#[cfg(feature = "recorder")]
mod recorder;

#[cfg(feature = "recorder")]
#[cfg_attr(docsrs, doc(cfg(feature = "recorder")))]
pub use recorder::Recorder;
