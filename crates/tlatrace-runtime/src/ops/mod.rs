pub mod count;
pub mod paths;
pub mod summary;
pub mod watch;

pub use count::{CountProgress, CountService, hash_trace};
pub use paths::{PathsProgress, PathsService, process_pair};
pub use summary::{Dispatcher, SummaryMapper, SummaryProgress, SummaryService};
pub use watch::WatchService;
