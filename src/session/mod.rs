mod state;

pub use state::{SessionState, SessionStateManager};
