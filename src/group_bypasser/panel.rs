//! Group Bypasser 面板
//!
//! 仅前端使用, 无输入输出

use pyo3::{
    pyclass, pymethods,
    types::{PyDict, PyDictMethods, PyTuple, PyType},
    Bound, Py, PyResult, Python,
};

use crate::core::category::CATEGORY_GROUP_BYPASSER;

/// Group Bypasser 面板
#[pyclass(subclass)]
pub struct GroupBypasserPanel {}

#[pymethods]
impl GroupBypasserPanel {
    #[new]
    fn new() -> Self {
        Self {}
    }

    // `()` 会被转换为 None, 这里需要空元组
    #[classattr]
    #[pyo3(name = "RETURN_TYPES")]
    fn return_types(py: Python<'_>) -> Bound<'_, PyTuple> {
        PyTuple::empty(py)
    }

    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_GROUP_BYPASSER;

    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Frontend-only panel. Backend no-op."
    }

    #[classattr]
    #[pyo3(name = "SEARCH_ALIASES")]
    fn search_aliases() -> Vec<&'static str> {
        vec!["group bypass", "panel", "group toggle", "cascade toggle"]
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
    fn execute<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyTuple>> {
        Ok(PyTuple::empty(py))
    }
}
