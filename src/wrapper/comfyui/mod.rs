//! ComfyUI 节点协议

mod prompt_server;
pub use prompt_server::PromptServer;

pub mod types;
