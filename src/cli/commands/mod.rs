mod search;

pub use search::{SearchArgs, cmd_search};
