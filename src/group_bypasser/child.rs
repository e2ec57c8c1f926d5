//! Group Bypass Child
//!
//! 级联旁路的目标节点, 后端原样透传输入

use pyo3::{
    pyclass, pymethods,
    types::{PyDict, PyDictMethods, PyType},
    Bound, Py, PyAny, PyResult, Python,
};

use crate::{core::category::CATEGORY_GROUP_BYPASSER, wrapper::comfyui::types::NODE_ANY};

/// Group Bypass Child
#[pyclass(subclass)]
pub struct GroupBypasserChild {}

#[pymethods]
impl GroupBypasserChild {
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
        "Frontend-controlled marker. Backend is pass-through."
    }

    #[classattr]
    #[pyo3(name = "SEARCH_ALIASES")]
    fn search_aliases() -> Vec<&'static str> {
        vec!["group bypass child", "cascade child", "group marker child"]
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
            dict.set_item("optional", {
                let optional = PyDict::new(py);
                optional.set_item(
                    "from_parent",
                    (NODE_ANY, {
                        let from_parent = PyDict::new(py);
                        from_parent.set_item("tooltip", "UI only. Link marker.")?;
                        from_parent
                    }),
                )?;
                optional
            })?;
            Ok(dict.into())
        })
    }

    #[pyo3(name = "execute", signature = (from_parent=None))]
    fn execute<'py>(
        &mut self,
        from_parent: Option<Bound<'py, PyAny>>,
    ) -> PyResult<(Option<Bound<'py, PyAny>>,)> {
        Ok((from_parent,))
    }
}
