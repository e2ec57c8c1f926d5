//! 按提示词条件应用 LoRA

use std::path::{Path, PathBuf};

use log::{info, warn};
use fancy_regex::Regex;

use crate::{
    error::Error,
    lora::{
        strategy::{LoraChain, LoraRequest},
        trigger_table::LoraEntry,
    },
};

/// LoRA 名称到文件路径的解析
pub trait LoraPathResolver {
    fn resolve(&self, name: &str) -> Result<Option<PathBuf>, Error>;
}

/// 应用结果
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedLoras<M> {
    pub model: M,
    pub clip: M,
    /// `<lora:stem:sm:sc>` 标记, 按应用顺序
    pub tokens: Vec<String>,
}

impl<M> AppliedLoras<M> {
    /// 以空格连接的标记
    pub fn applied(&self) -> String {
        self.tokens.join(" ")
    }
}

/// 正则匹配提示词, 任意位置匹配即可
///
/// 支持环视与反向引用 (`(?<!no )cat`, `(\w+) \1`)。
/// 空表达式不匹配; 非法表达式或匹配超出回溯上限时记录日志并视为不匹配
pub fn trigger_matches(text: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    let re = match Regex::new(pattern) {
        Ok(v) => v,
        Err(e) => {
            warn!("Invalid regex in TOML: {e}");
            return false;
        }
    };

    re.is_match(text).unwrap_or_else(|e| {
        warn!("Regex match failed: {pattern}, {e}");
        false
    })
}

/// 强度的文本形式, 与 Python `repr(float)` 一致
///
/// - 整数值保留一位小数: `1.0`
/// - 绝对值小于 1e-4 或不小于 1e16 时使用科学计数法, 指数至少两位: `1e-05`, `1.5e+16`
pub fn format_strength(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let abs = value.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        // `{:e}` 为最短表示, 如 1.5e16 / 1e-5
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => formatted,
        };
    }

    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// 生成 `<lora:stem:sm:sc>` 标记, stem 为去掉目录与扩展名的文件名
pub fn lora_token(name: &str, strength_model: f64, strength_clip: f64) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    format!(
        "<lora:{stem}:{}:{}>",
        format_strength(strength_model),
        format_strength(strength_clip)
    )
}

/// 依次检查触发规则, 匹配则解析路径并通过策略链应用
///
/// 任何单条规则的失败只记录日志, 不影响后续规则
pub fn apply_conditional_loras<M, R>(
    entries: &[LoraEntry],
    positive: &str,
    resolver: &R,
    chain: &LoraChain<'_, M>,
    model: M,
    clip: M,
) -> AppliedLoras<M>
where
    R: LoraPathResolver + ?Sized,
{
    let mut applied = AppliedLoras {
        model,
        clip,
        tokens: Vec::new(),
    };

    for (i, entry) in entries.iter().enumerate() {
        let matched = trigger_matches(positive, &entry.trigger);
        info!(
            "#{i} matched={matched} trigger={:?} name={:?} sm={} sc={}",
            entry.trigger, entry.name, entry.strength_model, entry.strength_clip
        );
        if !matched {
            continue;
        }

        let path = match resolver.resolve(&entry.name) {
            Ok(Some(path)) => path,
            Ok(None) => {
                warn!("LoRA not found: {}", entry.name);
                continue;
            }
            Err(e) => {
                warn!("LoRA not found: {}, {e}", entry.name);
                continue;
            }
        };

        let request = LoraRequest {
            name: entry.name.clone(),
            path,
            strength_model: entry.strength_model,
            strength_clip: entry.strength_clip,
        };

        match chain.apply(&applied.model, &applied.clip, &request) {
            Ok((model, clip)) => {
                info!(
                    "Applied LoRA: {} (m={}, c={})",
                    entry.name, entry.strength_model, entry.strength_clip
                );
                applied.model = model;
                applied.clip = clip;
                applied.tokens.push(lora_token(
                    &entry.name,
                    entry.strength_model,
                    entry.strength_clip,
                ));
            }
            Err(e) => warn!("Failed to apply LoRA: {}, {e}", entry.name),
        }
    }

    if applied.tokens.is_empty() {
        info!("No LoRA applied (passthrough)");
    }

    applied
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap};

    use super::*;
    use crate::lora::strategy::tests::FakeStrategy;

    struct MapResolver(HashMap<&'static str, &'static str>);

    impl LoraPathResolver for MapResolver {
        fn resolve(&self, name: &str) -> Result<Option<PathBuf>, Error> {
            Ok(self.0.get(name).map(PathBuf::from))
        }
    }

    fn entry(trigger: &str, name: &str, sm: f64, sc: f64) -> LoraEntry {
        LoraEntry {
            trigger: trigger.to_string(),
            name: name.to_string(),
            strength_model: sm,
            strength_clip: sc,
        }
    }

    fn resolver() -> MapResolver {
        MapResolver(HashMap::from([
            ("styles/ink.safetensors", "/models/loras/styles/ink.safetensors"),
            ("detail.safetensors", "/models/loras/detail.safetensors"),
        ]))
    }

    #[test]
    fn test_trigger_matches() {
        assert!(trigger_matches("a cat on a mat", "cat"));
        assert!(trigger_matches("Ink Painting", "(?i)ink\\s+painting"));
        assert!(!trigger_matches("a dog", "cat"));
        assert!(!trigger_matches("anything", ""));
        assert!(!trigger_matches("anything", "(unclosed"));
    }

    #[test]
    fn test_trigger_matches_lookaround_and_backref() {
        assert!(trigger_matches("a cat", "(?<!no )cat"));
        assert!(!trigger_matches("no cat", "(?<!no )cat"));
        assert!(trigger_matches("watercolor style", "water(?=color)"));
        assert!(trigger_matches("hello hello", r"(\w+) \1"));
        assert!(!trigger_matches("hello world", r"(\w+) \1"));
    }

    #[test]
    fn test_lora_token() {
        assert_eq!(
            lora_token("styles/ink.safetensors", 0.8, 1.0),
            "<lora:ink:0.8:1.0>"
        );
        assert_eq!(lora_token("detail", 1.0, -0.25), "<lora:detail:1.0:-0.25>");
        assert_eq!(format_strength(2.0), "2.0");
        assert_eq!(format_strength(0.75), "0.75");
    }

    #[test]
    fn test_format_strength_exponent() {
        assert_eq!(format_strength(1e-5), "1e-05");
        assert_eq!(format_strength(1.5e-7), "1.5e-07");
        assert_eq!(format_strength(1e16), "1e+16");
        assert_eq!(format_strength(-2.5e20), "-2.5e+20");
        assert_eq!(format_strength(1e100), "1e+100");
        assert_eq!(format_strength(0.0001), "0.0001");
        assert_eq!(format_strength(123456789.0), "123456789.0");
        assert_eq!(format_strength(0.0), "0.0");
        assert_eq!(format_strength(-0.5), "-0.5");
        assert_eq!(
            lora_token("tiny.safetensors", 1e-5, 1.0),
            "<lora:tiny:1e-05:1.0>"
        );
    }

    #[test]
    fn test_matching_entry_is_applied() -> anyhow::Result<()> {
        let calls = RefCell::new(Vec::new());
        let chain: LoraChain<String> = LoraChain::new(vec![Box::new(FakeStrategy {
            label: "builtin",
            available: true,
            succeed: true,
            calls: &calls,
        })]);

        let entries = vec![entry("ink", "styles/ink.safetensors", 0.8, 0.6)];
        let applied = apply_conditional_loras(
            &entries,
            "ink wash landscape",
            &resolver(),
            &chain,
            "m".to_string(),
            "c".to_string(),
        );

        assert_eq!(applied.model, "m+styles/ink.safetensors@0.8");
        assert_eq!(applied.clip, "c+styles/ink.safetensors@0.6");
        assert_eq!(applied.applied(), "<lora:ink:0.8:0.6>");
        Ok(())
    }

    #[test]
    fn test_no_match_passes_through() -> anyhow::Result<()> {
        let calls = RefCell::new(Vec::new());
        let chain: LoraChain<String> = LoraChain::new(vec![Box::new(FakeStrategy {
            label: "builtin",
            available: true,
            succeed: true,
            calls: &calls,
        })]);

        let entries = vec![entry("ink", "styles/ink.safetensors", 0.8, 0.6)];
        let applied = apply_conditional_loras(
            &entries,
            "oil painting",
            &resolver(),
            &chain,
            "m".to_string(),
            "c".to_string(),
        );

        assert_eq!(applied.model, "m");
        assert_eq!(applied.clip, "c");
        assert!(applied.tokens.is_empty());
        assert_eq!(applied.applied(), "");
        assert!(calls.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_regex_does_not_stop_later_entries() -> anyhow::Result<()> {
        let calls = RefCell::new(Vec::new());
        let chain: LoraChain<String> = LoraChain::new(vec![Box::new(FakeStrategy {
            label: "builtin",
            available: true,
            succeed: true,
            calls: &calls,
        })]);

        let entries = vec![
            entry("[broken", "styles/ink.safetensors", 1.0, 1.0),
            entry("detail", "detail.safetensors", 0.5, 0.5),
        ];
        let applied = apply_conditional_loras(
            &entries,
            "high detail",
            &resolver(),
            &chain,
            "m".to_string(),
            "c".to_string(),
        );

        assert_eq!(applied.tokens, vec!["<lora:detail:0.5:0.5>".to_string()]);
        Ok(())
    }

    #[test]
    fn test_unresolved_and_failed_entries_are_skipped() -> anyhow::Result<()> {
        let calls = RefCell::new(Vec::new());
        let failing: LoraChain<String> = LoraChain::new(vec![Box::new(FakeStrategy {
            label: "broken",
            available: true,
            succeed: false,
            calls: &calls,
        })]);

        let entries = vec![
            entry("ink", "missing.safetensors", 1.0, 1.0),
            entry("ink", "styles/ink.safetensors", 1.0, 1.0),
        ];
        let applied = apply_conditional_loras(
            &entries,
            "ink",
            &resolver(),
            &failing,
            "m".to_string(),
            "c".to_string(),
        );

        assert_eq!(applied.model, "m");
        assert_eq!(applied.clip, "c");
        assert!(applied.tokens.is_empty());
        // 未找到文件的规则不会进入策略链
        assert_eq!(*calls.borrow(), vec!["broken"]);
        Ok(())
    }

    #[test]
    fn test_multiple_matches_accumulate() -> anyhow::Result<()> {
        let calls = RefCell::new(Vec::new());
        let chain: LoraChain<String> = LoraChain::new(vec![Box::new(FakeStrategy {
            label: "builtin",
            available: true,
            succeed: true,
            calls: &calls,
        })]);

        let entries = vec![
            entry("ink", "styles/ink.safetensors", 0.8, 0.6),
            entry("detail", "detail.safetensors", 1.0, 1.0),
        ];
        let applied = apply_conditional_loras(
            &entries,
            "ink, fine detail",
            &resolver(),
            &chain,
            "m".to_string(),
            "c".to_string(),
        );

        assert_eq!(
            applied.model,
            "m+styles/ink.safetensors@0.8+detail.safetensors@1"
        );
        assert_eq!(applied.applied(), "<lora:ink:0.8:0.6> <lora:detail:1.0:1.0>");
        Ok(())
    }
}
