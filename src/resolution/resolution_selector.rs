//! 分辨率选择器
//!
//! 选项在 INPUT_TYPES 求值时加载 (即 ComfyUI 启动时)

use std::path::Path;

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
    resolution::combos::{load_resolution_combos, Resolution},
    wrapper::comfyui::{types::NODE_INT, PromptServer},
};

/// 分辨率选择器
#[pyclass(subclass)]
pub struct ResolutionSelector {}

impl PromptServer for ResolutionSelector {}

#[pymethods]
impl ResolutionSelector {
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
        "Select a resolution from predefined combos (loaded from JSON on startup)."
    }

    #[classattr]
    #[pyo3(name = "SEARCH_ALIASES")]
    fn search_aliases() -> Vec<&'static str> {
        vec!["resolution", "size", "width", "height"]
    }

    #[classattr]
    #[pyo3(name = "FUNCTION")]
    const FUNCTION: &'static str = "execute";

    #[classmethod]
    #[pyo3(name = "INPUT_TYPES")]
    fn input_types(_cls: &Bound<'_, PyType>) -> PyResult<Py<PyDict>> {
        Python::with_gil(|py| {
            let settings = Settings::global().map_err(|e| Self::value_error(py, e))?;
            let options = Self::input_options(py, settings.config_dir())?;

            let dict = PyDict::new(py);
            dict.set_item("required", {
                let required = PyDict::new(py);
                required.set_item(
                    "resolution",
                    (options, {
                        let resolution = PyDict::new(py);
                        resolution.set_item("tooltip", "width x height")?;
                        resolution
                    }),
                )?;
                required
            })?;
            Ok(dict.into())
        })
    }

    #[pyo3(name = "execute")]
    fn execute(&mut self, py: Python, resolution: &str) -> PyResult<(i64, i64)> {
        let resolution = resolution
            .parse::<Resolution>()
            .map_err(|e| Self::value_error(py, e))?;
        Ok((resolution.width, resolution.height))
    }
}

impl ResolutionSelector {
    /// 下拉选项, "WxH"
    ///
    /// 加载失败时通知前端并抛出 ValueError
    fn input_options(py: Python, config_dir: &Path) -> PyResult<Vec<String>> {
        let combos = load_resolution_combos(config_dir).map_err(|e| Self::value_error(py, e))?;
        Ok(combos.iter().map(|combo| combo.to_string()).collect())
    }

    fn value_error(py: Python, e: Error) -> PyErr {
        error!("ResolutionSelector error, {e}");
        if let Err(e) = Self::send_error(py, "ResolutionSelector", &e.to_string()) {
            error!("send error failed, {e}");
        }
        PyErr::new::<PyValueError, _>(e.to_string())
    }
}
