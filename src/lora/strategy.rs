//! LoRA 应用策略链
//!
//! 宿主提供多种 LoRA 应用接口, 按优先级依次尝试, 第一个成功即停止。

use std::path::PathBuf;

use log::{debug, warn};

use crate::error::Error;

/// 一次 LoRA 应用请求
#[derive(Debug, Clone, PartialEq)]
pub struct LoraRequest {
    /// 配置中的 LoRA 名称 (相对 loras 目录)
    pub name: String,
    /// 解析后的完整路径
    pub path: PathBuf,
    pub strength_model: f64,
    pub strength_clip: f64,
}

/// LoRA 应用策略
///
/// `M` 为模型与文本编码器的句柄类型
pub trait LoraStrategy<M> {
    /// 策略名称, 用于日志
    fn name(&self) -> String;

    /// 宿主是否提供该接口
    fn is_available(&self) -> bool {
        true
    }

    /// 应用 LoRA, 返回新的 (model, clip)
    fn apply(&self, model: &M, clip: &M, request: &LoraRequest) -> Result<(M, M), Error>;
}

/// 按优先级排列的策略链
pub struct LoraChain<'a, M> {
    strategies: Vec<Box<dyn LoraStrategy<M> + 'a>>,
}

impl<'a, M> LoraChain<'a, M> {
    pub fn new(strategies: Vec<Box<dyn LoraStrategy<M> + 'a>>) -> Self {
        Self { strategies }
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// 依次尝试各策略
    ///
    /// 不可用或失败的策略记录日志后跳过, 全部失败时返回 `AllStrategiesFailed`
    pub fn apply(&self, model: &M, clip: &M, request: &LoraRequest) -> Result<(M, M), Error> {
        for strategy in &self.strategies {
            if !strategy.is_available() {
                debug!("{} is not available, skipped", strategy.name());
                continue;
            }

            match strategy.apply(model, clip, request) {
                Ok(v) => {
                    debug!("{} applied {}", strategy.name(), request.name);
                    return Ok(v);
                }
                Err(e) => warn!("{} failed: {e}", strategy.name()),
            }
        }

        warn!("All loaders failed -> passthrough.");
        Err(Error::AllStrategiesFailed)
    }
}
