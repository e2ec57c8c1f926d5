//! LoRA 触发配置
//!
//! ```toml
//! [[lora]]
//! trigger = "(?i)\\bwatercolor\\b"
//! name = "styles/watercolor.safetensors"
//! strength_model = 0.8
//! strength_clip = 0.6
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::error;
use serde::{Deserialize, Deserializer};

use crate::{
    core::utils::directory::{list_files_with_extension, mtime_or_zero},
    error::Error,
};

/// 配置目录为空时的占位选项
pub const TRIGGER_FILE_PLACEHOLDER: &str = "<put .toml in config>";

/// 触发配置文件
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct TriggerTable {
    pub lora: Vec<LoraEntry>,
}

/// 单条触发规则
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoraEntry {
    /// 正则表达式
    #[serde(default)]
    pub trigger: String,
    /// LoRA 文件名
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_strength", deserialize_with = "deserialize_strength")]
    pub strength_model: f64,
    #[serde(default = "default_strength", deserialize_with = "deserialize_strength")]
    pub strength_clip: f64,
}

fn default_strength() -> f64 {
    1.0
}

/// 强度支持数字 (整数按浮点数读取) 以及数字字符串
fn deserialize_strength<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Strength {
        Number(f64),
        Text(String),
    }

    match Strength::deserialize(deserializer)? {
        Strength::Number(v) => Ok(v),
        Strength::Text(v) => v.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

impl TriggerTable {
    /// 解析 TOML 文本
    pub fn parse(content: &str) -> Result<Self, Error> {
        let value: toml::Table = toml::from_str(content)?;
        match value.get("lora") {
            Some(toml::Value::Array(_)) => {}
            Some(other) => {
                return Err(Error::InvalidTriggerTable(format!(
                    "`lora` is a {}",
                    other.type_str()
                )))
            }
            None => return Err(Error::InvalidTriggerTable("`lora` is missing".to_string())),
        }

        let table = toml::Value::Table(value).try_into::<TriggerTable>()?;
        Ok(table)
    }
}

/// 列出配置目录下的触发配置文件
///
/// 目录不存在时自动创建; 没有配置文件时返回占位选项
pub fn list_trigger_files(config_dir: &Path) -> Vec<String> {
    if let Err(e) = fs::create_dir_all(config_dir) {
        error!("create config dir {} failed, {e}", config_dir.display());
    }

    let files = list_files_with_extension(config_dir, "toml");
    if files.is_empty() {
        return vec![TRIGGER_FILE_PLACEHOLDER.to_string()];
    }
    files
}

/// 触发配置文件路径
pub fn trigger_file_path(config_dir: &Path, file_name: &str) -> PathBuf {
    config_dir.join(file_name)
}

/// 条件 LoRA 节点的 IS_CHANGED 指纹, "{config_toml}:{mtime}"
pub fn trigger_fingerprint(config_dir: &Path, file_name: &str) -> String {
    let mtime = if file_name.is_empty() {
        0.0
    } else {
        mtime_or_zero(&trigger_file_path(config_dir, file_name))
    };
    format!("{file_name}:{mtime}")
}

/// 读取并解析触发配置
pub fn load_trigger_table(config_dir: &Path, file_name: &str) -> Result<Vec<LoraEntry>, Error> {
    let path = trigger_file_path(config_dir, file_name);
    if !path.is_file() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(&path)?;
    let table = TriggerTable::parse(&content)?;
    Ok(table.lora)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries_with_defaults() -> anyhow::Result<()> {
        let table = TriggerTable::parse(
            r#"
[[lora]]
trigger = "cat"
name = "animals/cat.safetensors"
strength_model = 0.75
strength_clip = 1

[[lora]]
name = "detail.safetensors"
strength_clip = "0.5"
"#,
        )?;

        assert_eq!(table.lora.len(), 2);
        assert_eq!(table.lora[0].trigger, "cat");
        assert_eq!(table.lora[0].strength_model, 0.75);
        assert_eq!(table.lora[0].strength_clip, 1.0);

        assert_eq!(table.lora[1].trigger, "");
        assert_eq!(table.lora[1].strength_model, 1.0);
        assert_eq!(table.lora[1].strength_clip, 0.5);
        Ok(())
    }

    #[test]
    fn test_integer_and_negative_strengths() -> anyhow::Result<()> {
        let table = TriggerTable::parse(
            "[[lora]]\ntrigger = \"x\"\nname = \"x.safetensors\"\nstrength_model = 2\nstrength_clip = -1\n",
        )?;
        assert_eq!(table.lora[0].strength_model, 2.0);
        assert_eq!(table.lora[0].strength_clip, -1.0);

        let result = TriggerTable::parse("[[lora]]\nstrength_model = \"strong\"\n");
        assert!(matches!(result, Err(Error::TomlError(_))));
        Ok(())
    }

    #[test]
    fn test_trigger_fingerprint() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(trigger_fingerprint(dir.path(), "styles.toml"), "styles.toml:0");
        assert_eq!(trigger_fingerprint(dir.path(), ""), ":0");

        fs::write(dir.path().join("styles.toml"), "lora = []")?;
        let fingerprint = trigger_fingerprint(dir.path(), "styles.toml");
        let mtime = fingerprint
            .strip_prefix("styles.toml:")
            .ok_or_else(|| anyhow::anyhow!("unexpected fingerprint {fingerprint}"))?;
        assert!(mtime.parse::<f64>()? > 0.0);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_missing_lora_array() -> anyhow::Result<()> {
        let result = TriggerTable::parse("title = \"no loras\"\n");
        assert!(matches!(result, Err(Error::InvalidTriggerTable(_))));

        let result = TriggerTable::parse("lora = \"not an array\"\n");
        assert!(matches!(result, Err(Error::InvalidTriggerTable(_))));
        Ok(())
    }

    #[test]
    fn test_parse_rejects_malformed_toml() -> anyhow::Result<()> {
        let result = TriggerTable::parse("[[lora]\ntrigger = ");
        assert!(matches!(result, Err(Error::TomlError(_))));
        Ok(())
    }

    #[test]
    fn test_empty_lora_array_is_valid() -> anyhow::Result<()> {
        let table = TriggerTable::parse("lora = []\n")?;
        assert!(table.lora.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_trigger_table_missing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let result = load_trigger_table(dir.path(), "absent.toml");
        assert!(matches!(result, Err(Error::FileNotFound(_))));
        Ok(())
    }

    #[test]
    fn test_load_trigger_table_from_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join("portrait.toml"),
            "[[lora]]\ntrigger = \"portrait\"\nname = \"face.safetensors\"\n",
        )?;

        let entries = load_trigger_table(dir.path(), "portrait.toml")?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "face.safetensors");
        Ok(())
    }

    #[test]
    fn test_list_trigger_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config_dir = dir.path().join("config");

        assert_eq!(
            list_trigger_files(&config_dir),
            vec![TRIGGER_FILE_PLACEHOLDER.to_string()]
        );
        assert!(config_dir.is_dir());

        fs::write(config_dir.join("z.toml"), "lora = []")?;
        fs::write(config_dir.join("a.toml"), "lora = []")?;
        assert_eq!(
            list_trigger_files(&config_dir),
            vec!["a.toml".to_string(), "z.toml".to_string()]
        );
        Ok(())
    }
}
