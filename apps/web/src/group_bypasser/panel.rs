//! Group Bypasser Panel 节点的前端
//!
//! 面板固定有 4 个小部件 (order mode, order titles, edit order, refresh),
//! 其后为每个分组的开关。画布分组标题变化时自动重建开关

use js_sys::Reflect;
use serde::Serialize;
use serde_json::{json, Value};
use wasm_bindgen::{prelude::Closure, JsCast, JsValue};
use web_sys::console;

use super::{
    cascade::{group_has_parent, group_titles, is_group_bypassed, toggle_group},
    graph::JsGraph,
    order::{
        ordered_groups, panel_height, titles_signature, toggle_label, OrderMode, PROP_ORDER_MODE,
        PROP_ORDER_TITLES,
    },
    order_editor::OrderEditor,
};
use crate::comfy::{chain_prototype_method, ComfyApp, ComfyNode};

/// 固定小部件数量, 之后均为分组开关
const STATIC_COUNT_KEY: &str = "_hybsStaticCount";
/// 上次重建时的分组标题签名
const SIGNATURE_KEY: &str = "_hybsSig";
/// 开关绑定的分组对象
const GROUP_KEY: &str = "_hybsGroup";

type WidgetCallback = Closure<dyn Fn(JsValue) -> Result<(), JsValue>>;

pub struct GroupBypasserPanel {}

impl GroupBypasserPanel {
    /// 替换 Panel 节点原型上的 onNodeCreated / onDrawForeground
    pub fn install(node_type: &JsValue) -> Result<(), JsValue> {
        let prototype = Reflect::get(node_type, &"prototype".into())?;

        chain_prototype_method(&prototype, "onNodeCreated", |node| {
            Self::on_node_created(&node)
        })?;

        // 每帧同步开关状态, 分组变化时重建
        chain_prototype_method(&prototype, "onDrawForeground", |node| {
            if let Err(e) = Self::sync_toggles(&node) {
                console::error_2(&"sync group toggles failed".into(), &e);
            }
            Self::rebuild(&node, false)
        })?;

        Ok(())
    }

    fn on_node_created(node: &ComfyNode) -> Result<(), JsValue> {
        let order_mode = match node.property(PROP_ORDER_MODE)? {
            Some(v) => v,
            None => {
                node.set_property(PROP_ORDER_MODE, OrderMode::Auto.as_ref())?;
                OrderMode::Auto.to_string()
            }
        };
        let order_titles = match node.property(PROP_ORDER_TITLES)? {
            Some(v) => v,
            None => {
                node.set_property(PROP_ORDER_TITLES, "")?;
                String::new()
            }
        };

        let on_mode = Self::property_callback(node, PROP_ORDER_MODE);
        node.add_widget(
            "combo",
            "order mode",
            order_mode.into(),
            Some(on_mode.as_ref().unchecked_ref()),
            to_js_options(&json!({
                "values": [OrderMode::Auto.as_ref(), OrderMode::Custom.as_ref()],
            }))?,
        )?;
        on_mode.forget();

        let on_titles = Self::property_callback(node, PROP_ORDER_TITLES);
        node.add_widget(
            "string",
            "order titles",
            order_titles.into(),
            Some(on_titles.as_ref().unchecked_ref()),
            to_js_options(&json!({ "multiline": true }))?,
        )?;
        on_titles.forget();

        let on_edit = {
            let node = node.clone();
            WidgetCallback::wrap(Box::new(move |_value: JsValue| OrderEditor::open(&node)))
        };
        node.add_widget(
            "button",
            "edit order",
            "edit".into(),
            Some(on_edit.as_ref().unchecked_ref()),
            JsValue::UNDEFINED,
        )?;
        on_edit.forget();

        let on_refresh = {
            let node = node.clone();
            WidgetCallback::wrap(Box::new(move |_value: JsValue| Self::rebuild(&node, true)))
        };
        node.add_widget(
            "button",
            "refresh",
            "refresh".into(),
            Some(on_refresh.as_ref().unchecked_ref()),
            JsValue::UNDEFINED,
        )?;
        on_refresh.forget();

        let static_count = node.widgets()?.length();
        node.set(STATIC_COUNT_KEY, &JsValue::from_f64(static_count as f64))?;

        Self::rebuild(node, true)
    }

    /// 修改属性后强制重建
    fn property_callback(node: &ComfyNode, key: &'static str) -> WidgetCallback {
        let node = node.clone();
        WidgetCallback::wrap(Box::new(move |value: JsValue| {
            node.set_property(key, &value.as_string().unwrap_or_default())?;
            Self::rebuild(&node, true)
        }))
    }

    fn static_count(node: &ComfyNode) -> Result<u32, JsValue> {
        Ok(node.get(STATIC_COUNT_KEY)?.as_f64().unwrap_or_default() as u32)
    }

    /// 重建分组开关
    ///
    /// force 为 false 时, 分组标题签名未变化则跳过
    pub fn rebuild(node: &ComfyNode, force: bool) -> Result<(), JsValue> {
        let app = ComfyApp::new();
        let graph = JsGraph::from_app(&app)?;

        let titles = group_titles(&graph);
        let signature = titles_signature(&titles);
        if !force && node.get(SIGNATURE_KEY)?.as_string().as_deref() == Some(signature.as_str()) {
            return Ok(());
        }
        node.set(SIGNATURE_KEY, &signature.into())?;

        node.truncate_widgets(Self::static_count(node)?)?;

        let mode = node
            .property(PROP_ORDER_MODE)?
            .and_then(|v| v.parse::<OrderMode>().ok())
            .unwrap_or_default();
        let order_titles = node.property(PROP_ORDER_TITLES)?.unwrap_or_default();
        let order = ordered_groups(&titles, mode, &order_titles);

        for &index in &order {
            let group = graph.group(index);
            let label = toggle_label(&titles[index], group_has_parent(&graph, index));

            let on_toggle = Self::toggle_callback(group.clone());
            let widget = node.add_widget(
                "toggle",
                &label,
                is_group_bypassed(&graph, index).into(),
                Some(on_toggle.as_ref().unchecked_ref()),
                JsValue::UNDEFINED,
            )?;
            on_toggle.forget();

            // 绑定分组对象而不是下标, 排序后仍然对应
            Reflect::set(&widget, &GROUP_KEY.into(), &group)?;
        }

        node.set_size(node.width()?, panel_height(order.len()))?;
        app.set_dirty_canvas()
    }

    fn toggle_callback(group: JsValue) -> WidgetCallback {
        WidgetCallback::wrap(Box::new(move |value: JsValue| {
            let app = ComfyApp::new();
            let mut graph = JsGraph::from_app(&app)?;
            // 分组已被删除
            let Some(index) = graph.group_index(&group) else {
                return Ok(());
            };
            toggle_group(&mut graph, index, value.is_truthy());
            app.set_dirty_canvas()
        }))
    }

    /// 开关值跟随分组内节点的实际模式
    fn sync_toggles(node: &ComfyNode) -> Result<(), JsValue> {
        let graph = JsGraph::from_app(&ComfyApp::new())?;
        let widgets = node.widgets()?;

        for widget in widgets.iter().skip(Self::static_count(node)? as usize) {
            if !widget.is_object() {
                continue;
            }
            if Reflect::get(&widget, &"type".into())?.as_string().as_deref() != Some("toggle") {
                continue;
            }
            let group = Reflect::get(&widget, &GROUP_KEY.into())?;
            let Some(index) = graph.group_index(&group) else {
                continue;
            };
            Reflect::set(&widget, &"value".into(), &is_group_bypassed(&graph, index).into())?;
        }
        Ok(())
    }
}

/// 小部件 options 需要普通对象, 不能是 Map
fn to_js_options(options: &Value) -> Result<JsValue, JsValue> {
    Ok(options.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}
