mod stage;
pub use stage::*;
mod args;
pub use args::*;
mod hooks;
pub use hooks::*;
mod notify;
pub use notify::*;
