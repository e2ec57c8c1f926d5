//! Conditional LoRA Loader
//!
//! 正向提示词匹配 TOML 配置中的正则时应用对应的 LoRA,
//! 输出 `<lora:name:m:c>` 标记 (空格分隔)。
//!
//! 配置加载失败或没有规则匹配时, model/clip 原样输出。

use log::{error, warn};
use pyo3::{
    exceptions::PyRuntimeError,
    pyclass, pymethods,
    types::{PyDict, PyDictMethods, PyType},
    Bound, Py, PyAny, PyErr, PyResult, Python,
};

use crate::{
    core::{category::CATEGORY_CONDITIONAL_LORA, settings::Settings},
    lora::{
        conditional::apply_conditional_loras,
        trigger_table::{list_trigger_files, load_trigger_table, trigger_fingerprint},
    },
    wrapper::{
        comfy::{folder_paths::FolderPaths, lora_loaders::host_lora_chain},
        comfyui::types::{NODE_CLIP, NODE_MODEL, NODE_STRING},
    },
};

/// Conditional LoRA Loader
#[pyclass(subclass)]
pub struct ConditionalLoraLoader {}

#[pymethods]
impl ConditionalLoraLoader {
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
    fn return_types() -> (&'static str, &'static str, &'static str) {
        (NODE_MODEL, NODE_CLIP, NODE_STRING)
    }

    #[classattr]
    #[pyo3(name = "RETURN_NAMES")]
    fn return_names() -> (&'static str, &'static str, &'static str) {
        ("model", "clip", "applied loras")
    }

    #[classattr]
    #[pyo3(name = "OUTPUT_IS_LIST")]
    fn output_is_list() -> (bool, bool, bool) {
        (false, false, false)
    }

    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_CONDITIONAL_LORA;

    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Conditionally apply LoRAs based on regex matches in the positive. Outputs tokens like <lora:name:m:c> (space-separated)."
    }

    #[classattr]
    #[pyo3(name = "SEARCH_ALIASES")]
    fn search_aliases() -> Vec<&'static str> {
        vec![
            "lora",
            "regex lora",
            "conditional lora",
            "prompt match lora",
        ]
    }

    #[classattr]
    #[pyo3(name = "FUNCTION")]
    const FUNCTION: &'static str = "execute";

    #[classmethod]
    #[pyo3(name = "INPUT_TYPES")]
    fn input_types(_cls: &Bound<'_, PyType>) -> PyResult<Py<PyDict>> {
        Python::with_gil(|py| {
            let settings =
                Settings::global().map_err(|e| PyErr::new::<PyRuntimeError, _>(e.to_string()))?;
            let tomls = list_trigger_files(settings.config_dir());

            let dict = PyDict::new(py);
            dict.set_item("required", {
                let required = PyDict::new(py);
                required.set_item("model", (NODE_MODEL, PyDict::new(py)))?;
                required.set_item("clip", (NODE_CLIP, PyDict::new(py)))?;
                required.set_item(
                    "positive",
                    (NODE_STRING, {
                        let positive = PyDict::new(py);
                        positive.set_item("default", "")?;
                        positive.set_item("multiline", true)?;
                        positive.set_item("forceInput", true)?;
                        positive.set_item(
                            "tooltip",
                            "Positive prompt to be matched against regex patterns.",
                        )?;
                        positive
                    }),
                )?;
                required.set_item(
                    "config_toml",
                    (tomls, {
                        let config_toml = PyDict::new(py);
                        config_toml.set_item(
                            "tooltip",
                            "TOML filename under config/ with [[lora]] entries.",
                        )?;
                        config_toml
                    }),
                )?;
                required
            })?;
            Ok(dict.into())
        })
    }

    /// 配置文件修改后重新执行
    #[classmethod]
    #[pyo3(name = "IS_CHANGED", signature = (config_toml=None, **_kwargs))]
    fn is_changed(
        _cls: &Bound<'_, PyType>,
        config_toml: Option<String>,
        _kwargs: Option<&Bound<'_, PyDict>>,
    ) -> String {
        let config_toml = config_toml.unwrap_or_default();
        match Settings::global() {
            Ok(settings) => trigger_fingerprint(settings.config_dir(), &config_toml),
            Err(_) => format!("{config_toml}:0"),
        }
    }

    #[pyo3(name = "execute", signature = (model, clip, positive=None, config_toml=String::new()))]
    fn execute<'py>(
        &mut self,
        py: Python<'py>,
        model: Bound<'py, PyAny>,
        clip: Bound<'py, PyAny>,
        positive: Option<String>,
        config_toml: String,
    ) -> PyResult<(Bound<'py, PyAny>, Bound<'py, PyAny>, String)> {
        let settings = match Settings::global() {
            Ok(v) => v,
            Err(e) => {
                error!("ConditionalLoraLoader config error, {e}");
                return Ok((model, clip, String::new()));
            }
        };

        let entries = match load_trigger_table(settings.config_dir(), &config_toml) {
            Ok(v) => v,
            Err(e) => {
                warn!("TOML load error: {e}");
                return Ok((model, clip, String::new()));
            }
        };

        let resolver = match FolderPaths::new(py) {
            Ok(v) => v,
            Err(e) => {
                error!("folder_paths is not available, {e}");
                return Ok((model, clip, String::new()));
            }
        };
        let chain = host_lora_chain(py);

        let positive = positive.unwrap_or_default();
        let applied = apply_conditional_loras(&entries, &positive, &resolver, &chain, model, clip);
        let text = applied.applied();
        Ok((applied.model, applied.clip, text))
    }
}
