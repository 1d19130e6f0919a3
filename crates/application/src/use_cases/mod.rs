pub mod resolve_query;

pub use resolve_query::{QueryInfo, Resolution, ResolveQueryUseCase};
