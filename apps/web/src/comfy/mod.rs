//! ComfyUI 前端对象封装

mod app;
pub use app::ComfyApp;

mod extension;
pub use extension::Extension;

mod node;
pub use node::{chain_prototype_method, ComfyNode};
