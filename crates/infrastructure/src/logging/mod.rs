pub mod batch_logger;

pub use batch_logger::{event_queue, BatchSink, EventLogger, EventSender, LoggerConfig};
