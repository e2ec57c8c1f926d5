//! 扩展配置
//!
//! 配置目录在启动时确定一次, 之后所有节点共享:
//! 1. Python 包入口调用 `configure(config_dir)`
//! 2. 环境变量 `HYBS_CONFIG_DIR`
//! 3. `<cwd>/custom_nodes/ComfyUI-hybs-nodes/config`, ComfyUI 以安装目录作为工作目录启动

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use log::info;
use pyo3::{exceptions::PyRuntimeError, pyfunction, PyErr, PyResult};

use crate::error::Error;

/// 配置目录环境变量
pub const CONFIG_DIR_ENV: &str = "HYBS_CONFIG_DIR";

/// 扩展目录名称
pub const EXTENSION_DIR_NAME: &str = "ComfyUI-hybs-nodes";

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// 扩展配置
#[derive(Debug, Clone)]
pub struct Settings {
    config_dir: PathBuf,
}

impl Settings {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// 从环境变量或工作目录推导默认配置
    pub fn from_env() -> Result<Self, Error> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(Self::new(dir));
        }

        let base_path = std::env::current_dir()?;
        Ok(Self::new(
            base_path
                .join("custom_nodes")
                .join(EXTENSION_DIR_NAME)
                .join("config"),
        ))
    }

    /// 配置目录
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// 获取全局配置, 未显式配置时使用默认值
    pub fn global() -> Result<&'static Settings, Error> {
        if let Some(settings) = SETTINGS.get() {
            return Ok(settings);
        }
        let settings = Self::from_env()?;
        Ok(SETTINGS.get_or_init(|| settings))
    }

    /// 设置全局配置, 只能设置一次
    pub fn install(settings: Settings) -> Result<(), Error> {
        SETTINGS.set(settings).map_err(|settings| {
            Error::OnceLock(format!(
                "config dir already set, ignored {}",
                settings.config_dir.display()
            ))
        })
    }
}

/// 设置配置目录
///
/// 由 Python 包入口在注册节点前调用
#[pyfunction]
pub fn configure(config_dir: PathBuf) -> PyResult<()> {
    info!("config dir: {}", config_dir.display());
    Settings::install(Settings::new(config_dir))
        .map_err(|e| PyErr::new::<PyRuntimeError, _>(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_config_dir() -> anyhow::Result<()> {
        let settings = Settings::new("/tmp/hybs/config");
        assert_eq!(settings.config_dir(), Path::new("/tmp/hybs/config"));
        Ok(())
    }

    #[test]
    fn test_global_is_stable() -> anyhow::Result<()> {
        let first = Settings::global()?.config_dir().to_path_buf();
        let second = Settings::global()?.config_dir().to_path_buf();
        assert_eq!(first, second);
        assert!(Settings::install(Settings::new("/elsewhere")).is_err());
        Ok(())
    }
}
