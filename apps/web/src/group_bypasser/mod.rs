//! 分组旁路面板
//!
//! Parent / Child 节点不添加前端 UI, 只由 Panel 节点的开关控制

pub mod cascade;
pub mod order;

mod graph;
mod order_editor;

mod panel;
pub use panel::GroupBypasserPanel;
