//! 宿主 LoRA 加载接口
//!
//! 不同版本的 ComfyUI 提供的接口不同, 按优先级依次尝试:
//! 1. comfy.sd.load_lora
//! 2. nodes.LoraLoader
//! 3. comfy.utils.load_torch_file + comfy.sd.load_lora_for_models / comfy.utils.apply_lora

use pyo3::{
    types::{PyAnyMethods, PyDict, PyDictMethods, PyModule},
    Bound, PyAny, Python,
};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::{
    error::Error,
    lora::strategy::{LoraChain, LoraRequest, LoraStrategy},
};

/// 宿主接口, 声明顺序即优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum HostLoraApi {
    #[strum(to_string = "comfy.sd.load_lora")]
    SdLoadLora,
    #[strum(to_string = "nodes.LoraLoader")]
    BuiltinLoraLoader,
    #[strum(to_string = "comfy.utils.apply_lora")]
    UtilsApplyLora,
}

/// 通过宿主 Python 接口应用 LoRA
pub struct HostLoraStrategy<'py> {
    py: Python<'py>,
    api: HostLoraApi,
}

impl<'py> HostLoraStrategy<'py> {
    pub fn new(py: Python<'py>, api: HostLoraApi) -> Self {
        Self { py, api }
    }

    fn import(&self, name: &str) -> Result<Bound<'py, PyModule>, Error> {
        Ok(self.py.import(name)?)
    }

    /// 模块是否存在指定属性
    fn has_attr(&self, module: &str, attr: &str) -> bool {
        self.import(module)
            .map(|m| m.hasattr(attr).unwrap_or(false))
            .unwrap_or(false)
    }

    fn sd_load_lora(
        &self,
        model: &Bound<'py, PyAny>,
        clip: &Bound<'py, PyAny>,
        request: &LoraRequest,
    ) -> Result<(Bound<'py, PyAny>, Bound<'py, PyAny>), Error> {
        let sd = self.import("comfy.sd")?;
        let result = sd.call_method1(
            "load_lora",
            (
                model,
                clip,
                request.path.to_string_lossy().to_string(),
                request.strength_model,
                request.strength_clip,
            ),
        )?;
        Ok(result.extract()?)
    }

    fn builtin_lora_loader(
        &self,
        model: &Bound<'py, PyAny>,
        clip: &Bound<'py, PyAny>,
        request: &LoraRequest,
    ) -> Result<(Bound<'py, PyAny>, Bound<'py, PyAny>), Error> {
        let loader = self.import("nodes")?.getattr("LoraLoader")?.call0()?;
        let result = loader.call_method1(
            "load_lora",
            (
                model,
                clip,
                request.name.as_str(),
                request.strength_model,
                request.strength_clip,
            ),
        )?;
        Ok(result.extract()?)
    }

    fn utils_apply_lora(
        &self,
        model: &Bound<'py, PyAny>,
        clip: &Bound<'py, PyAny>,
        request: &LoraRequest,
    ) -> Result<(Bound<'py, PyAny>, Bound<'py, PyAny>), Error> {
        let utils = self.import("comfy.utils")?;

        let kwargs = PyDict::new(self.py);
        kwargs.set_item("safe_load", true)?;
        let lora = utils.call_method(
            "load_torch_file",
            (request.path.to_string_lossy().to_string(),),
            Some(&kwargs),
        )?;

        if self.has_attr("comfy.sd", "load_lora_for_models") {
            let result = self.import("comfy.sd")?.call_method1(
                "load_lora_for_models",
                (
                    model,
                    clip,
                    &lora,
                    request.strength_model,
                    request.strength_clip,
                ),
            )?;
            return Ok(result.extract()?);
        }

        if !utils.hasattr("apply_lora")? {
            return Err(Error::StrategyUnavailable(
                "comfy.utils.apply_lora".to_string(),
            ));
        }

        let new_model = utils.call_method1("apply_lora", (model, &lora, request.strength_model))?;
        let mut new_clip = clip.clone();
        if !clip.is_none() && request.strength_clip != 0.0 && utils.hasattr("apply_lora_to_clip")? {
            new_clip = utils.call_method1("apply_lora_to_clip", (clip, &lora, request.strength_clip))?;
        }
        Ok((new_model, new_clip))
    }
}

impl<'py> LoraStrategy<Bound<'py, PyAny>> for HostLoraStrategy<'py> {
    fn name(&self) -> String {
        self.api.to_string()
    }

    fn is_available(&self) -> bool {
        match self.api {
            HostLoraApi::SdLoadLora => self.has_attr("comfy.sd", "load_lora"),
            HostLoraApi::BuiltinLoraLoader => self.has_attr("nodes", "LoraLoader"),
            HostLoraApi::UtilsApplyLora => self.import("comfy.utils").is_ok(),
        }
    }

    fn apply(
        &self,
        model: &Bound<'py, PyAny>,
        clip: &Bound<'py, PyAny>,
        request: &LoraRequest,
    ) -> Result<(Bound<'py, PyAny>, Bound<'py, PyAny>), Error> {
        match self.api {
            HostLoraApi::SdLoadLora => self.sd_load_lora(model, clip, request),
            HostLoraApi::BuiltinLoraLoader => self.builtin_lora_loader(model, clip, request),
            HostLoraApi::UtilsApplyLora => self.utils_apply_lora(model, clip, request),
        }
    }
}

/// 宿主策略链
pub fn host_lora_chain<'py>(py: Python<'py>) -> LoraChain<'py, Bound<'py, PyAny>> {
    LoraChain::new(
        HostLoraApi::iter()
            .map(|api| {
                Box::new(HostLoraStrategy::new(py, api))
                    as Box<dyn LoraStrategy<Bound<'py, PyAny>> + 'py>
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_api_priority() {
        let apis = HostLoraApi::iter().map(|api| api.to_string()).collect::<Vec<_>>();
        assert_eq!(
            apis,
            vec![
                "comfy.sd.load_lora",
                "nodes.LoraLoader",
                "comfy.utils.apply_lora"
            ]
        );
    }

    #[test]
    #[ignore]
    fn test_host_chain_without_comfy() -> anyhow::Result<()> {
        Python::with_gil(|py| -> anyhow::Result<()> {
            let chain = host_lora_chain(py);
            assert_eq!(chain.len(), 3);

            let model = py.None().into_bound(py);
            let clip = py.None().into_bound(py);
            let request = LoraRequest {
                name: "missing.safetensors".to_string(),
                path: "/nonexistent/missing.safetensors".into(),
                strength_model: 1.0,
                strength_clip: 1.0,
            };
            assert!(chain.apply(&model, &clip, &request).is_err());
            Ok(())
        })
    }
}
