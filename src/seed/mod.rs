//! 种子

mod seed_list_generator;
pub use seed_list_generator::{generate_seeds, SeedListGenerator};

use pyo3::{
    types::{PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::core::node::NodeRegister;

/// 种子模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "seed")?;
    submodule.add_class::<SeedListGenerator>()?;
    Ok(submodule)
}

/// 种子节点注册
pub fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let nodes: Vec<NodeRegister> = vec![NodeRegister(
        "Seed List Generator",
        py.get_type::<SeedListGenerator>(),
        "Seed List Generator",
    )];
    Ok(nodes)
}
