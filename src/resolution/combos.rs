//! 分辨率组合
//!
//! `<config_dir>/resolution_combos.json` 不存在时使用内置默认列表;
//! 文件存在但格式错误时返回错误, 由节点上报前端。

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde_json::Value;

use crate::{core::utils::directory::mtime_or_zero, error::Error};

/// 配置文件名称
pub const RESOLUTION_CONFIG_NAME: &str = "resolution_combos.json";

/// 分辨率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: i64,
    pub height: i64,
}

impl Resolution {
    pub const fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = Error;

    /// 解析 "1024x1024"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once('x')
            .ok_or_else(|| Error::InvalidResolution(s.to_string()))?;
        let width = width
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::InvalidResolution(s.to_string()))?;
        let height = height
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::InvalidResolution(s.to_string()))?;
        Ok(Self { width, height })
    }
}

/// 默认分辨率组合
pub const DEFAULT_COMBOS: [Resolution; 59] = [
    // 正方形 1024 ~ 2048, 步长 64
    Resolution::new(1024, 1024),
    Resolution::new(1088, 1088),
    Resolution::new(1152, 1152),
    Resolution::new(1216, 1216),
    Resolution::new(1280, 1280),
    Resolution::new(1344, 1344),
    Resolution::new(1408, 1408),
    Resolution::new(1472, 1472),
    Resolution::new(1536, 1536),
    Resolution::new(1600, 1600),
    Resolution::new(1664, 1664),
    Resolution::new(1728, 1728),
    Resolution::new(1792, 1792),
    Resolution::new(1856, 1856),
    Resolution::new(1920, 1920),
    Resolution::new(1984, 1984),
    Resolution::new(2048, 2048),
    // 竖版
    Resolution::new(896, 1152),
    Resolution::new(832, 1216),
    Resolution::new(768, 1280),
    Resolution::new(704, 1344),
    Resolution::new(640, 1408),
    Resolution::new(576, 1472),
    Resolution::new(512, 1536),
    Resolution::new(1408, 1664),
    Resolution::new(1344, 1728),
    Resolution::new(1280, 1792),
    Resolution::new(1216, 1856),
    Resolution::new(1152, 1920),
    Resolution::new(1088, 1984),
    Resolution::new(1024, 2048),
    Resolution::new(1920, 2048),
    Resolution::new(1856, 2048),
    Resolution::new(1792, 2048),
    Resolution::new(1728, 2048),
    Resolution::new(1664, 2048),
    Resolution::new(1600, 2048),
    Resolution::new(1536, 2048),
    // 横版
    Resolution::new(1152, 896),
    Resolution::new(1216, 832),
    Resolution::new(1280, 768),
    Resolution::new(1344, 704),
    Resolution::new(1408, 640),
    Resolution::new(1472, 576),
    Resolution::new(1536, 512),
    Resolution::new(1664, 1408),
    Resolution::new(1728, 1344),
    Resolution::new(1792, 1280),
    Resolution::new(1856, 1216),
    Resolution::new(1920, 1152),
    Resolution::new(1984, 1088),
    Resolution::new(2048, 1024),
    Resolution::new(2048, 1920),
    Resolution::new(2048, 1856),
    Resolution::new(2048, 1792),
    Resolution::new(2048, 1728),
    Resolution::new(2048, 1664),
    Resolution::new(2048, 1600),
    Resolution::new(2048, 1536),
];

/// 配置文件路径
pub fn resolution_config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(RESOLUTION_CONFIG_NAME)
}

/// 加载分辨率组合
///
/// 文件不存在时返回默认列表, 解析或校验失败时返回错误
pub fn load_resolution_combos(config_dir: &Path) -> Result<Vec<Resolution>, Error> {
    let path = resolution_config_path(config_dir);
    if !path.is_file() {
        return Ok(DEFAULT_COMBOS.to_vec());
    }

    let content = fs::read_to_string(&path)?;
    let value: Value = serde_json::from_str(&content)?;
    validate_pairs(&value)
}

/// 校验 `[[w, h], ...]`
///
/// 浮点数, 布尔值, 字符串均视为非法
pub fn validate_pairs(value: &Value) -> Result<Vec<Resolution>, Error> {
    let invalid = || Error::InvalidCombos(RESOLUTION_CONFIG_NAME.to_string());

    let items = value.as_array().ok_or_else(invalid)?;
    if items.is_empty() {
        return Err(invalid());
    }

    items
        .iter()
        .map(|item| match item.as_array().map(|pair| pair.as_slice()) {
            Some([width, height]) => match (width.as_i64(), height.as_i64()) {
                (Some(width), Some(height)) => Ok(Resolution { width, height }),
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        })
        .collect()
}

/// 配置文件修改时间, 不存在时为 0.0
pub fn resolution_config_mtime(config_dir: &Path) -> f64 {
    mtime_or_zero(&resolution_config_path(config_dir))
}

/// 随机分辨率节点的 IS_CHANGED 指纹, "{seed}:{mtime}"
pub fn resolution_fingerprint(config_dir: &Path, seed: u64) -> String {
    format!("{seed}:{}", resolution_config_mtime(config_dir))
}

/// 根据种子选择分辨率, index = seed % len
pub fn select_by_seed(combos: &[Resolution], seed: u64) -> Result<Resolution, Error> {
    if combos.is_empty() {
        return Err(Error::ListEmpty);
    }
    let index = (seed % combos.len() as u64) as usize;
    Ok(combos[index])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_combos() {
        assert_eq!(DEFAULT_COMBOS.len(), 59);
        assert_eq!(DEFAULT_COMBOS[0], Resolution::new(1024, 1024));
        assert_eq!(DEFAULT_COMBOS[58], Resolution::new(2048, 1536));
    }

    #[test]
    fn test_label_round_trip() -> anyhow::Result<()> {
        for combo in DEFAULT_COMBOS {
            assert_eq!(combo.to_string().parse::<Resolution>()?, combo);
        }
        Ok(())
    }

    #[test]
    fn test_parse_invalid_label() {
        assert!("1024".parse::<Resolution>().is_err());
        assert!("axb".parse::<Resolution>().is_err());
        assert!("1024x".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let combos = load_resolution_combos(dir.path())?;
        assert_eq!(combos, DEFAULT_COMBOS.to_vec());
        assert_eq!(resolution_config_mtime(dir.path()), 0.0);
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            resolution_config_path(dir.path()),
            "[[512, 768], [768, 512]]",
        )?;

        let combos = load_resolution_combos(dir.path())?;
        assert_eq!(
            combos,
            vec![Resolution::new(512, 768), Resolution::new(768, 512)]
        );
        assert!(resolution_config_mtime(dir.path()) > 0.0);
        Ok(())
    }

    #[test]
    fn test_load_malformed_json() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(resolution_config_path(dir.path()), "[[512, 768],")?;

        let result = load_resolution_combos(dir.path());
        assert!(matches!(result, Err(Error::SerdeJsonError(_))));
        Ok(())
    }

    #[test]
    fn test_validate_pairs_rejects_bad_shapes() {
        let cases = [
            json!([]),
            json!({"width": 512}),
            json!([[512]]),
            json!([[512, 768, 1]]),
            json!([[512.0, 768]]),
            json!([[true, 768]]),
            json!([["512", 768]]),
            json!([[512, 768], 3]),
        ];
        for case in cases {
            assert!(
                matches!(validate_pairs(&case), Err(Error::InvalidCombos(_))),
                "{case} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolution_fingerprint() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(resolution_fingerprint(dir.path(), 7), "7:0");

        fs::write(resolution_config_path(dir.path()), "[[512, 768]]")?;
        let fingerprint = resolution_fingerprint(dir.path(), 7);
        let (seed, mtime) = fingerprint
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("missing separator"))?;
        assert_eq!(seed, "7");
        assert!(mtime.parse::<f64>()? > 0.0);
        Ok(())
    }

    #[test]
    fn test_select_by_seed() -> anyhow::Result<()> {
        let combos = vec![
            Resolution::new(512, 512),
            Resolution::new(768, 512),
            Resolution::new(512, 768),
        ];
        assert_eq!(select_by_seed(&combos, 0)?, combos[0]);
        assert_eq!(select_by_seed(&combos, 4)?, combos[1]);
        assert_eq!(select_by_seed(&combos, u64::MAX)?, combos[0]);
        assert!(matches!(select_by_seed(&[], 1), Err(Error::ListEmpty)));
        Ok(())
    }
}
