//! 文件夹路径
//!
//! 宿主模块 folder_paths 的封装, 模型目录由 ComfyUI 统一管理 (含 extra_model_paths.yaml)

use std::path::PathBuf;

use pyo3::{
    types::{PyAnyMethods, PyModule},
    Bound, Python,
};

use crate::{error::Error, lora::conditional::LoraPathResolver};

/// folder_paths
pub struct FolderPaths<'py> {
    module: Bound<'py, PyModule>,
}

impl<'py> FolderPaths<'py> {
    pub fn new(py: Python<'py>) -> Result<Self, Error> {
        let module = py.import("folder_paths")?;
        Ok(Self { module })
    }

    /// 获取完整文件路径
    pub fn get_full_path(&self, folder_name: &str, filename: &str) -> Result<Option<PathBuf>, Error> {
        let path = self
            .module
            .call_method1("get_full_path", (folder_name, filename))?
            .extract::<Option<String>>()?;
        Ok(path.filter(|p| !p.is_empty()).map(PathBuf::from))
    }
}

impl LoraPathResolver for FolderPaths<'_> {
    fn resolve(&self, name: &str) -> Result<Option<PathBuf>, Error> {
        self.get_full_path("loras", name)
    }
}
