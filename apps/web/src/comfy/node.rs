//! LGraphNode 实例封装

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{prelude::Closure, JsCast, JsValue};

/// 画布中的节点实例
#[derive(Debug, Clone)]
pub struct ComfyNode {
    inner: JsValue,
}

impl ComfyNode {
    pub fn new(inner: JsValue) -> Self {
        Self { inner }
    }

    /// 获取inner对象
    pub fn get_inner(&self) -> JsValue {
        self.inner.clone()
    }

    /// 读取节点上的任意字段
    pub fn get(&self, key: &str) -> Result<JsValue, JsValue> {
        Reflect::get(&self.inner, &key.into())
    }

    /// 写入节点上的任意字段
    pub fn set(&self, key: &str, value: &JsValue) -> Result<(), JsValue> {
        Reflect::set(&self.inner, &key.into(), value)?;
        Ok(())
    }

    /// node.properties, 不存在时创建
    pub fn properties(&self) -> Result<JsValue, JsValue> {
        let properties = self.get("properties")?;
        if properties.is_object() {
            return Ok(properties);
        }
        let properties: JsValue = Object::new().into();
        self.set("properties", &properties)?;
        Ok(properties)
    }

    /// 读取字符串属性
    pub fn property(&self, key: &str) -> Result<Option<String>, JsValue> {
        let value = Reflect::get(&self.properties()?, &key.into())?;
        Ok(value.as_string())
    }

    /// 写入字符串属性
    pub fn set_property(&self, key: &str, value: &str) -> Result<(), JsValue> {
        Reflect::set(&self.properties()?, &key.into(), &value.into())?;
        Ok(())
    }

    /// 获取小部件列表
    pub fn widgets(&self) -> Result<Array, JsValue> {
        let widgets = self.get("widgets")?;
        if widgets.is_undefined() || widgets.is_null() {
            let widgets = Array::new();
            self.set("widgets", &widgets)?;
            return Ok(widgets);
        }
        widgets.dyn_into::<Array>()
    }

    /// 只保留前 len 个小部件
    pub fn truncate_widgets(&self, len: u32) -> Result<(), JsValue> {
        let widgets = self.widgets()?;
        if widgets.length() > len {
            widgets.set_length(len);
        }
        Ok(())
    }

    /// 添加小部件, 返回新建的 widget 对象
    ///
    /// binding: addWidget(type, name, value, callback, options)
    pub fn add_widget(
        &self,
        r#type: &str,
        name: &str,
        value: JsValue,
        callback: Option<&Function>,
        options: JsValue,
    ) -> Result<JsValue, JsValue> {
        let add_widget_fn = self.get("addWidget")?.dyn_into::<Function>()?;

        add_widget_fn.call5(
            &self.inner,
            &JsValue::from_str(r#type),
            &JsValue::from_str(name),
            &value,
            &callback.map(|f| AsRef::<JsValue>::as_ref(f).clone()).unwrap_or(JsValue::NULL),
            &options,
        )
    }

    /// 节点宽度
    pub fn width(&self) -> Result<f64, JsValue> {
        let size = self.get("size")?;
        Ok(Reflect::get(&size, &JsValue::from_f64(0.0))?
            .as_f64()
            .unwrap_or_default())
    }

    /// binding: setSize([w, h])
    pub fn set_size(&self, width: f64, height: f64) -> Result<(), JsValue> {
        let set_size_fn = self.get("setSize")?.dyn_into::<Function>()?;
        let size = Array::of2(&width.into(), &height.into());
        set_size_fn.call1(&self.inner, &size)?;
        Ok(())
    }
}

/// 替换原型上的方法, 先调用原方法再调用 handler
///
/// handler 的参数为节点实例 (`this`)
pub fn chain_prototype_method<F>(prototype: &JsValue, name: &str, handler: F) -> Result<(), JsValue>
where
    F: Fn(ComfyNode) -> Result<(), JsValue> + 'static,
{
    let original = Reflect::get(prototype, &name.into())?;

    let rust_handler = Closure::wrap(Box::new(move |this: JsValue| handler(ComfyNode::new(this)))
        as Box<dyn Fn(JsValue) -> Result<(), JsValue>>);

    // 创建 JavaScript 包装函数, 用于透传 this 对象到rust的闭包
    let wrapper_js = format!(
        r#"
            return function() {{
                const r = typeof original === "function" ? original.apply(this, arguments) : undefined;
                try {{
                    rustHandler(this);
                }} catch (e) {{
                    console.error("Error in {name}:", e);
                }}
                return r;
            }};
        "#
    );

    let create_wrapper = Function::new_with_args("original, rustHandler", &wrapper_js);
    let wrapper = create_wrapper
        .call2(&JsValue::NULL, &original, &rust_handler.as_ref().clone())?
        .dyn_into::<Function>()?;

    Reflect::set(prototype, &name.into(), &wrapper)?;

    // 保持闭包生命周期
    rust_handler.forget();

    Ok(())
}
