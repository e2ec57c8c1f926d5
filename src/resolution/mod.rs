//! 分辨率

pub mod combos;

mod resolution_selector;
pub use resolution_selector::ResolutionSelector;

mod random_resolution_selector;
pub use random_resolution_selector::RandomResolutionSelector;

use pyo3::{
    types::{PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::core::node::NodeRegister;

/// 分辨率模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "resolution")?;
    submodule.add_class::<ResolutionSelector>()?;
    submodule.add_class::<RandomResolutionSelector>()?;
    Ok(submodule)
}

/// 分辨率节点注册
pub fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let nodes: Vec<NodeRegister> = vec![
        NodeRegister(
            "HYBS_ResolutionSelector",
            py.get_type::<ResolutionSelector>(),
            "Resolution Selector",
        ),
        NodeRegister(
            "HYBS_RandomResolutionSelector",
            py.get_type::<RandomResolutionSelector>(),
            "Random Resolution Selector",
        ),
    ];
    Ok(nodes)
}
