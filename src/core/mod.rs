pub mod counter;
pub mod log_file;
pub mod window;

pub use counter::FrequencyCounter;
pub use log_file::{LoadError, ParsedLog, UnparsedLine};
pub use window::{parse_date_arg, DateArgError, TimeWindow};
