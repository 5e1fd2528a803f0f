pub mod cache;
pub mod server;
pub mod stats;
pub mod status;
pub mod upstream;

pub use cache::{CacheStats, DnsCache};
pub use server::RecursiveResolver;
pub use stats::{ResolverStats, StatusDocument};
pub use status::StatusWriter;
pub use upstream::UpstreamPool;
