//! 公共库
//!
//! 相关节点定义: ComfyUI/comfy/comfy_types/node_typing.py

use pyo3::{
    types::{PyModule, PyModuleMethods},
    wrap_pyfunction, Bound, PyResult, Python,
};

pub mod category;
pub mod node;
pub mod settings;
pub mod utils;

/// 核心模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "core")?;
    submodule.add_function(wrap_pyfunction!(settings::configure, &submodule)?)?;
    Ok(submodule)
}
