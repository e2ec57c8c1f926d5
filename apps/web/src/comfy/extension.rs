//! 扩展入口
//!
//! 网页加载时:
//! init → addCustomNodeDefs → getCustomWidgets → beforeRegisterNodeDef → registerCustomNodes → setup

use std::fmt;

use js_sys::{Object, Reflect};
use wasm_bindgen::{prelude::Closure, JsValue};
use web_sys::console;

/// 扩展
#[derive(Clone)]
pub struct Extension {
    /// 扩展名称, 需要唯一
    pub name: String,
    // 扩展对象
    extension: Object,
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Extension {{ extension: Object, name: {} }}", self.name)
    }
}

impl Extension {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            extension: Object::new(),
        }
    }

    /// 获取扩展对象
    pub fn as_js_value(&self) -> JsValue {
        self.extension.clone().into()
    }

    /// 设置beforeRegisterNodeDef钩子
    ///
    /// async beforeRegisterNodeDef(nodeType, nodeData, app)
    ///
    /// handler 参数: nodeType 构造函数, nodeData.name
    pub fn before_register_node_def<F>(&mut self, handler: F) -> Result<(), JsValue>
    where
        F: Fn(JsValue, String) -> Result<(), JsValue> + 'static,
    {
        let handler = Closure::wrap(Box::new(move |node_type: JsValue, node_data: JsValue| {
            let name = Reflect::get(&node_data, &"name".into())?
                .as_string()
                .unwrap_or_default();
            if let Err(e) = handler(node_type, name.clone()) {
                console::error_2(&format!("beforeRegisterNodeDef failed, node: {name}").into(), &e);
            }
            Ok(JsValue::undefined())
        })
            as Box<dyn Fn(JsValue, JsValue) -> Result<JsValue, JsValue>>);

        Reflect::set(
            &self.extension,
            &"beforeRegisterNodeDef".into(),
            &handler.as_ref().clone(),
        )?;

        // 保持闭包生命周期
        handler.forget();

        Ok(())
    }
}
