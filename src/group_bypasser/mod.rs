//! Group Bypasser
//!
//! 前端级联旁路的标记节点

mod child;
mod panel;
mod parent;

pub use child::GroupBypasserChild;
pub use panel::GroupBypasserPanel;
pub use parent::GroupBypasserParent;

use pyo3::{
    types::{PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::core::node::NodeRegister;

/// Group Bypasser 模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "group_bypasser")?;
    submodule.add_class::<GroupBypasserParent>()?;
    submodule.add_class::<GroupBypasserChild>()?;
    submodule.add_class::<GroupBypasserPanel>()?;
    Ok(submodule)
}

/// Group Bypasser 节点注册
pub fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let nodes: Vec<NodeRegister> = vec![
        NodeRegister(
            "HYBS_GroupBypasser_Parent",
            py.get_type::<GroupBypasserParent>(),
            "Group Bypass Parent",
        ),
        NodeRegister(
            "HYBS_GroupBypasser_Child",
            py.get_type::<GroupBypasserChild>(),
            "Group Bypass Child",
        ),
        NodeRegister(
            "HYBS_GroupBypasser_Panel",
            py.get_type::<GroupBypasserPanel>(),
            "Group Bypasser",
        ),
    ];
    Ok(nodes)
}
