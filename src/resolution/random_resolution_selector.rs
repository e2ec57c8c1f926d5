//! 随机分辨率选择器
//!
//! 每次执行重新加载配置, index = seed % len(combos)

use log::error;
use pyo3::{
    exceptions::PyValueError,
    pyclass, pymethods,
    types::{PyDict, PyDictMethods, PyType},
    Bound, Py, PyErr, PyResult, Python,
};

use crate::{
    core::{category::CATEGORY_RESOLUTION, settings::Settings},
    error::Error,
    resolution::combos::{
        load_resolution_combos, resolution_fingerprint, select_by_seed, Resolution,
    },
    wrapper::comfyui::{
        types::{NODE_INT, NODE_INT_MAX},
        PromptServer,
    },
};

/// 随机分辨率选择器
#[pyclass(subclass)]
pub struct RandomResolutionSelector {}

impl PromptServer for RandomResolutionSelector {}

#[pymethods]
impl RandomResolutionSelector {
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
        (NODE_INT, NODE_INT)
    }

    #[classattr]
    #[pyo3(name = "RETURN_NAMES")]
    fn return_names() -> (&'static str, &'static str) {
        ("width", "height")
    }

    #[classattr]
    #[pyo3(name = "OUTPUT_IS_LIST")]
    fn output_is_list() -> (bool, bool) {
        (false, false)
    }

    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_RESOLUTION;

    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Selects a (width, height) from a list based on seed. Reloads JSON on every execution."
    }

    #[classattr]
    #[pyo3(name = "SEARCH_ALIASES")]
    fn search_aliases() -> Vec<&'static str> {
        vec!["random resolution", "size by seed", "deterministic size"]
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
                required.set_item(
                    "seed",
                    (NODE_INT, {
                        let seed = PyDict::new(py);
                        seed.set_item("default", 0)?;
                        seed.set_item("min", 0)?;
                        seed.set_item("max", NODE_INT_MAX)?;
                        seed.set_item("step", 1)?;
                        seed.set_item("tooltip", "Deterministic pick: index = seed % len(combos)")?;
                        seed
                    }),
                )?;
                required
            })?;
            Ok(dict.into())
        })
    }

    /// 配置文件修改后重新执行
    #[classmethod]
    #[pyo3(name = "IS_CHANGED", signature = (seed=0, **_kwargs))]
    fn is_changed(
        _cls: &Bound<'_, PyType>,
        seed: u64,
        _kwargs: Option<&Bound<'_, PyDict>>,
    ) -> String {
        match Settings::global() {
            Ok(settings) => resolution_fingerprint(settings.config_dir(), seed),
            Err(_) => format!("{seed}:0"),
        }
    }

    #[pyo3(name = "execute")]
    fn execute(&mut self, py: Python, seed: u64) -> PyResult<(i64, i64)> {
        match self.select(seed) {
            Ok(v) => Ok((v.width, v.height)),
            Err(e) => {
                error!("RandomResolutionSelector error, {e}");
                if let Err(e) = Self::send_error(py, "RandomResolutionSelector", &e.to_string()) {
                    error!("send error failed, {e}");
                }
                Err(PyErr::new::<PyValueError, _>(e.to_string()))
            }
        }
    }
}

impl RandomResolutionSelector {
    fn select(&self, seed: u64) -> Result<Resolution, Error> {
        let settings = Settings::global()?;
        let combos = load_resolution_combos(settings.config_dir())?;
        select_by_seed(&combos, seed)
    }
}
