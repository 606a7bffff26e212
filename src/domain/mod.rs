pub mod classification;
pub mod report;

pub use classification::{Classification, Divergence, Precedence};
pub use report::{RepositoryReport, RepositoryState, Upstream, serialize_lossy_path};
