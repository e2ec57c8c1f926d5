//! Comfy Js App

use js_sys::{Function, Reflect};
use wasm_bindgen::{prelude::*, JsValue};

use super::Extension;

#[wasm_bindgen(raw_module = "/scripts/app.js")]
extern "C" {
    // import { app } from "../../scripts/app.js";
    #[wasm_bindgen(thread_local_v2, js_name = app)]
    static APP: JsValue;
}

#[derive(Debug, Clone)]
pub struct ComfyApp {
    app: JsValue,
}

impl ComfyApp {
    pub fn new() -> Self {
        let app = APP.with(|app| app.clone());
        ComfyApp { app }
    }

    /// 当前画布的 graph 对象
    pub fn graph(&self) -> Result<JsValue, JsValue> {
        let graph = Reflect::get(&self.app, &"graph".into())?;
        if graph.is_undefined() || graph.is_null() {
            return Err(JsValue::from_str("app.graph is not available"));
        }
        Ok(graph)
    }

    /// 标记画布需要重绘
    ///
    /// binding: graph.setDirtyCanvas(true, true)
    pub fn set_dirty_canvas(&self) -> Result<(), JsValue> {
        let graph = self.graph()?;
        let func = Reflect::get(&graph, &"setDirtyCanvas".into())?.dyn_into::<Function>()?;
        func.call2(&graph, &JsValue::TRUE, &JsValue::TRUE)?;
        Ok(())
    }

    pub fn register_extension(&self, extension: &Extension) -> Result<(), JsValue> {
        let extension_obj = extension.as_js_value();

        // 设置name属性
        Reflect::set(&extension_obj, &"name".into(), &extension.name.clone().into())?;

        let register_func =
            Reflect::get(&self.app, &"registerExtension".into())?.dyn_into::<Function>()?;
        register_func.call1(&self.app, &extension_obj)?;

        Ok(())
    }
}

impl Default for ComfyApp {
    fn default() -> Self {
        Self::new()
    }
}
