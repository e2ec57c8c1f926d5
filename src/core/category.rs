//! 节点分类

/// 分辨率
pub const CATEGORY_RESOLUTION: &str = "HYBS/ResolutionSelector";
/// 随机种子
pub const CATEGORY_SEED: &str = "HYBS/SeedGenerator";
/// 条件 LoRA
pub const CATEGORY_CONDITIONAL_LORA: &str = "HYBS/ConditionalLoRALoader";
/// 分组旁路
pub const CATEGORY_GROUP_BYPASSER: &str = "HYBS/GroupBypasser";
