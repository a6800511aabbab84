pub mod completions;
pub mod invoke;
pub mod serve;

pub use completions::CompletionsCommand;
pub use invoke::InvokeCommand;
pub use serve::ServeCommand;
