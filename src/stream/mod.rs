//! Output side: byte sinks and flow control toward the pulse consumer.

mod flow;
mod queue;
mod sink;
#[cfg(feature = "std")]
mod writer;

pub use flow::FlowControl;
pub use queue::ByteQueue;
pub use sink::{PulseSink, SinkError};

#[cfg(feature = "std")]
pub use writer::WriteSink;
