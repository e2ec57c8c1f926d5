//! 条件 LoRA

pub mod conditional;
pub mod strategy;
pub mod trigger_table;

mod conditional_lora_loader;
pub use conditional_lora_loader::ConditionalLoraLoader;

use pyo3::{
    types::{PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::core::node::NodeRegister;

/// LoRA 模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "lora")?;
    submodule.add_class::<ConditionalLoraLoader>()?;
    Ok(submodule)
}

/// LoRA 节点注册
pub fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let nodes: Vec<NodeRegister> = vec![NodeRegister(
        "HYBS_ConditionalLoRALoader",
        py.get_type::<ConditionalLoraLoader>(),
        "Conditional LoRA Loader",
    )];
    Ok(nodes)
}
