//! 种子列表生成器

use pyo3::{
    pyclass, pymethods,
    types::{PyDict, PyDictMethods, PyType},
    Bound, Py, PyResult, Python,
};
use rand::Rng;

use crate::{
    core::category::CATEGORY_SEED,
    wrapper::comfyui::types::{NODE_INT, NODE_INT_MAX, NODE_LIST},
};

/// 生成 count 个 [0, 2^32-1] 范围内的随机种子
pub fn generate_seeds<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<u64> {
    (0..count).map(|_| rng.random::<u32>() as u64).collect()
}

/// 种子列表生成器
#[pyclass(subclass)]
pub struct SeedListGenerator {}

#[pymethods]
impl SeedListGenerator {
    #[new]
    fn new() -> Self {
        Self {}
    }

    #[classattr]
    #[pyo3(name = "INPUT_IS_LIST")]
    fn input_is_list() -> bool {
        false
    }

    #[classattr]
    #[pyo3(name = "RETURN_TYPES")]
    fn return_types() -> (&'static str, &'static str) {
        (NODE_LIST, NODE_INT)
    }

    #[classattr]
    #[pyo3(name = "RETURN_NAMES")]
    fn return_names() -> (&'static str, &'static str) {
        ("seed list", "count")
    }

    #[classattr]
    #[pyo3(name = "OUTPUT_IS_LIST")]
    fn output_is_list() -> (bool, bool) {
        (false, false)
    }

    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_SEED;

    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Generate a list of random seeds."
    }

    #[classattr]
    #[pyo3(name = "FUNCTION")]
    const FUNCTION: &'static str = "execute";

    #[classmethod]
    #[pyo3(name = "INPUT_TYPES")]
    fn input_types(_cls: &Bound<'_, PyType>) -> PyResult<Py<PyDict>> {
        Python::with_gil(|py| {
            let dict = PyDict::new(py);
            dict.set_item("required", {
                let required = PyDict::new(py);
                // 种子数量
                required.set_item(
                    "count",
                    (NODE_INT, {
                        let count = PyDict::new(py);
                        count.set_item("default", 1)?;
                        count.set_item("min", 1)?;
                        count.set_item("max", NODE_INT_MAX)?;
                        count
                    }),
                )?;
                required
            })?;
            Ok(dict.into())
        })
    }

    #[pyo3(name = "execute")]
    fn execute(&mut self, count: usize) -> PyResult<(Vec<u64>, usize)> {
        let seeds = generate_seeds(&mut rand::rng(), count);
        Ok((seeds, count))
    }
}
