//! 类型定义
//! 相关节点定义: ComfyUI/comfy/comfy_types/node_typing.py

pub const NODE_INT: &str = "INT";
pub const NODE_STRING: &str = "STRING";
pub const NODE_LIST: &str = "LIST";
pub const NODE_MODEL: &str = "MODEL";
pub const NODE_CLIP: &str = "CLIP";

/// 分组旁路节点之间的连接类型
pub const NODE_ANY: &str = "ANY";

pub const NODE_INT_MAX: u64 = 0xffffffffffffffffu64;
