pub mod core;
pub mod error;
pub mod wrapper;

pub mod group_bypasser;
pub mod lora;
pub mod resolution;
pub mod seed;

use pyo3::{
    pymodule,
    types::{PyDict, PyDictMethods, PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::core::node::NodeRegister;

/// HYBS 节点的 Rust 实现
#[pymodule]
#[pyo3(name = "comfyui_hybs")] // 需要与包名保持一致
fn py_init(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    // 初始化日志
    // 每个扩展模块都有自己的全局变量, 记录器与其他 Rust 原生扩展无关
    let _ = tracing_subscriber::fmt()
        .with_ansi(true)
        .with_max_level(tracing::Level::DEBUG)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .try_init();

    // 添加子模块
    m.add_submodule(&core::submodule(py)?)?;
    m.add_submodule(&resolution::submodule(py)?)?;
    m.add_submodule(&seed::submodule(py)?)?;
    m.add_submodule(&lora::submodule(py)?)?;
    m.add_submodule(&group_bypasser::submodule(py)?)?;

    // 注册 ComfyUI NODE_CLASS_MAPPINGS/NODE_DISPLAY_NAME_MAPPINGS
    let node_mapping = PyDict::new(py);
    let name_mapping = PyDict::new(py);

    let nodes = node_register(py)?;
    for node in nodes {
        node_mapping.set_item(node.0, node.1)?;
        name_mapping.set_item(node.0, node.2)?;
    }

    const WEB_DIRECTORY: &str = "./web/js";

    m.add("NODE_CLASS_MAPPINGS", node_mapping)?;
    m.add("NODE_DISPLAY_NAME_MAPPINGS", name_mapping)?;
    m.add("WEB_DIRECTORY", WEB_DIRECTORY)?;
    Ok(())
}

/// 节点注册
fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let mut nodes: Vec<NodeRegister> = Vec::new();
    nodes.extend(resolution::node_register(py)?);
    nodes.extend(seed::node_register(py)?);
    nodes.extend(lora::node_register(py)?);
    nodes.extend(group_bypasser::node_register(py)?);
    Ok(nodes)
}
