//! Group Bypass Parent
//!
//! 级联旁路的源节点, 旁路逻辑由前端完成, 后端无操作

use pyo3::{
    pyclass, pymethods,
    types::{PyDict, PyDictMethods, PyType},
    Bound, Py, PyAny, PyResult, Python,
};

use crate::{core::category::CATEGORY_GROUP_BYPASSER, wrapper::comfyui::types::NODE_ANY};

/// Group Bypass Parent
#[pyclass(subclass)]
pub struct GroupBypasserParent {}

#[pymethods]
impl GroupBypasserParent {
    #[new]
    fn new() -> Self {
        Self {}
    }

    #[classattr]
    #[pyo3(name = "RETURN_TYPES")]
    fn return_types() -> (&'static str,) {
        (NODE_ANY,)
    }

    #[classattr]
    #[pyo3(name = "RETURN_NAMES")]
    fn return_names() -> (&'static str,) {
        ("to_children",)
    }

    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_GROUP_BYPASSER;

    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Frontend-only marker node for cascade bypass. Backend no-op."
    }

    #[classattr]
    #[pyo3(name = "SEARCH_ALIASES")]
    fn search_aliases() -> Vec<&'static str> {
        vec!["group bypass parent", "cascade parent", "group marker parent"]
    }

    #[classattr]
    #[pyo3(name = "FUNCTION")]
    const FUNCTION: &'static str = "execute";

    #[classmethod]
    #[pyo3(name = "INPUT_TYPES")]
    fn input_types(_cls: &Bound<'_, PyType>) -> PyResult<Py<PyDict>> {
        Python::with_gil(|py| {
            let dict = PyDict::new(py);
            dict.set_item("required", PyDict::new(py))?;
            Ok(dict.into())
        })
    }

    #[pyo3(name = "execute")]
    fn execute(&mut self, py: Python) -> PyResult<(Py<PyAny>,)> {
        Ok((py.None(),))
    }
}
