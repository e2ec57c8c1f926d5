//! 分组排序编辑器
//!
//! 模态框内拖拽排列分组标题, Save 后写入 `custom` 模式与 order_titles

use std::{cell::RefCell, rc::Rc};

use js_sys::Object;
use wasm_bindgen::{prelude::Closure, JsCast, JsValue};
use web_sys::{console, Document, DragEvent, Element, Event, EventTarget, Node};

use super::{
    cascade::group_titles,
    graph::JsGraph,
    order::{editor_order, join_order, OrderMode, PROP_ORDER_MODE, PROP_ORDER_TITLES},
    panel::GroupBypasserPanel,
};
use crate::comfy::{ComfyApp, ComfyNode};

const EDITOR_HTML: &str = r#"
<div class="hybs-modal" role="dialog" aria-modal="true">
  <div class="hybs-header">
    <div class="hybs-title">Group Order Editor</div>
    <button class="hybs-x" title="Close">×</button>
  </div>
  <div class="hybs-body">
    <div class="hybs-hint">Drag and drop to reorder. Click Save to apply.</div>
    <div class="hybs-list" tabindex="0"></div>
    <div class="hybs-actions">
      <button class="hybs-btn" data-action="auto">Auto</button>
      <button class="hybs-btn" data-action="reset">Reset</button>
      <div class="hybs-spacer"></div>
      <button class="hybs-btn hybs-btn-secondary" data-action="cancel">Cancel</button>
      <button class="hybs-btn hybs-btn-primary" data-action="save">Save</button>
    </div>
  </div>
</div>
"#;

const EDITOR_CSS: &str = r#"
.hybs-overlay{position:fixed;inset:0;background:rgba(0,0,0,0.55);z-index:999999;display:flex;align-items:center;justify-content:center;padding:18px;}
.hybs-modal{width:min(720px,96vw);max-height:min(80vh,820px);background:#1f1f1f;border:1px solid rgba(255,255,255,0.15);border-radius:10px;box-shadow:0 12px 40px rgba(0,0,0,0.6);display:flex;flex-direction:column;overflow:hidden;color:#e8e8e8;font:13px/1.4 sans-serif;}
.hybs-header{padding:12px 14px;display:flex;align-items:center;gap:10px;border-bottom:1px solid rgba(255,255,255,0.10);background:#242424;}
.hybs-title{font-size:14px;font-weight:700;}
.hybs-x{margin-left:auto;background:transparent;border:none;color:#e8e8e8;font-size:18px;cursor:pointer;line-height:1;padding:0 6px;opacity:0.85;}
.hybs-x:hover{opacity:1;}
.hybs-body{padding:14px;display:flex;flex-direction:column;gap:10px;overflow:hidden;}
.hybs-hint{opacity:0.9;}
.hybs-list{overflow:auto;border:1px solid rgba(255,255,255,0.10);border-radius:8px;background:#181818;padding:8px;min-height:140px;max-height:46vh;}
.hybs-item{display:flex;align-items:center;gap:10px;padding:8px 10px;margin:6px 0;border-radius:8px;border:1px solid rgba(255,255,255,0.08);background:#202020;cursor:grab;user-select:none;}
.hybs-item.dragging{opacity:0.55;}
.hybs-handle{width:14px;opacity:0.75;font-family:monospace;}
.hybs-drop-marker{height:0;border-top:2px solid rgba(255,255,255,0.55);margin:6px 0;}
.hybs-actions{display:flex;align-items:center;gap:10px;padding-top:6px;}
.hybs-spacer{flex:1;}
.hybs-btn{border:1px solid rgba(255,255,255,0.14);background:#2a2a2a;color:#e8e8e8;border-radius:8px;padding:8px 12px;cursor:pointer;}
.hybs-btn:hover{background:#313131;}
.hybs-btn-secondary{background:#252525;}
.hybs-btn-primary{background:#3a3a3a;border-color:rgba(255,255,255,0.22);font-weight:700;}
.hybs-btn-primary:hover{background:#424242;}
"#;

const ITEM_SELECTOR: &str = ".hybs-item";
const TITLE_ATTR: &str = "data-title";

pub struct OrderEditor {
    node: ComfyNode,
    document: Document,
    overlay: Element,
    style: Element,
    list: Element,
    marker: Element,
    /// 打开时的画布分组标题, Reset 使用
    current: Vec<String>,
    dragging: RefCell<Option<Element>>,
}

impl OrderEditor {
    /// 打开编辑器, 初始顺序为已保存顺序加上未列出的分组
    pub fn open(node: &ComfyNode) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or(JsValue::from_str("No window"))?;
        let document = window.document().ok_or(JsValue::from_str("No document"))?;

        let current = group_titles(&JsGraph::from_app(&ComfyApp::new())?);
        let order_titles = node.property(PROP_ORDER_TITLES)?.unwrap_or_default();
        let initial = editor_order(&current, &order_titles);

        let style = document.create_element("style")?;
        style.set_text_content(Some(EDITOR_CSS));
        document
            .head()
            .ok_or(JsValue::from_str("No head"))?
            .append_child(&style)?;

        let overlay = document.create_element("div")?;
        overlay.set_class_name("hybs-overlay");
        overlay.set_inner_html(EDITOR_HTML);

        let list = query(&overlay, ".hybs-list")?;
        let marker = document.create_element("div")?;
        marker.set_class_name("hybs-drop-marker");

        let editor = Rc::new(Self {
            node: node.clone(),
            document: document.clone(),
            overlay,
            style,
            list,
            marker,
            current,
            dragging: RefCell::new(None),
        });
        editor.render(&initial)?;
        Self::bind(&editor)?;

        document
            .body()
            .ok_or(JsValue::from_str("No body"))?
            .append_child(&editor.overlay)?;
        Ok(())
    }

    /// 标题以文本节点写入, 无需转义
    fn render(&self, titles: &[String]) -> Result<(), JsValue> {
        self.list.set_inner_html("");
        for title in titles {
            let item = self.document.create_element("div")?;
            item.set_class_name("hybs-item");
            item.set_attribute("draggable", "true")?;
            item.set_attribute(TITLE_ATTR, title)?;

            let handle = self.document.create_element("div")?;
            handle.set_class_name("hybs-handle");
            handle.set_text_content(Some("⋮⋮"));

            let label = self.document.create_element("div")?;
            label.set_text_content(Some(title));

            item.append_child(&handle)?;
            item.append_child(&label)?;
            self.list.append_child(&item)?;
        }
        Ok(())
    }

    /// 列表当前顺序
    fn current_order(&self) -> Result<Vec<String>, JsValue> {
        let items = self.list.query_selector_all(ITEM_SELECTOR)?;
        let order = (0..items.length())
            .filter_map(|i| items.get(i))
            .filter_map(|item| item.dyn_into::<Element>().ok())
            .filter_map(|item| item.get_attribute(TITLE_ATTR))
            .collect();
        Ok(order)
    }

    fn close(&self) {
        self.overlay.remove();
        self.style.remove();
    }

    fn save(&self, mode: OrderMode, order: &[String]) -> Result<(), JsValue> {
        self.close();
        self.node.set_property(PROP_ORDER_MODE, mode.as_ref())?;
        self.node.set_property(PROP_ORDER_TITLES, &join_order(order))?;
        GroupBypasserPanel::rebuild(&self.node, true)
    }

    fn on_drag_start(&self, event: &DragEvent) -> Result<(), JsValue> {
        let Some(item) = event_item(event)? else {
            return Ok(());
        };
        item.class_list().add_1("dragging")?;
        if let Some(data) = event.data_transfer() {
            data.set_effect_allowed("move");
            data.set_data("text/plain", &item.get_attribute(TITLE_ATTR).unwrap_or_default())?;
        }
        *self.dragging.borrow_mut() = Some(item);
        Ok(())
    }

    fn on_drag_end(&self) -> Result<(), JsValue> {
        if let Some(item) = self.dragging.borrow_mut().take() {
            item.class_list().remove_1("dragging")?;
        }
        self.marker.remove();
        Ok(())
    }

    /// 标记插入到光标下方最近的条目之前, 没有则放到末尾
    fn on_drag_over(&self, event: &DragEvent) -> Result<(), JsValue> {
        event.prevent_default();
        if self.dragging.borrow().is_none() {
            return Ok(());
        }

        let y = event.client_y() as f64;
        let items = self
            .list
            .query_selector_all(&format!("{ITEM_SELECTOR}:not(.dragging)"))?;
        let mut closest: Option<(f64, Element)> = None;
        for item in (0..items.length())
            .filter_map(|i| items.get(i))
            .filter_map(|item| item.dyn_into::<Element>().ok())
        {
            let rect = item.get_bounding_client_rect();
            let offset = y - (rect.top() + rect.height() / 2.0);
            if offset < 0.0 && closest.as_ref().map_or(true, |(best, _)| offset > *best) {
                closest = Some((offset, item));
            }
        }

        self.marker.remove();
        let marker: &Node = &self.marker;
        match closest {
            Some((_, item)) => {
                let item: &Node = &item;
                self.list.insert_before(marker, Some(item))?;
            }
            None => {
                self.list.append_child(marker)?;
            }
        }
        Ok(())
    }

    fn on_drop(&self, event: &DragEvent) -> Result<(), JsValue> {
        event.prevent_default();
        let dragging = self.dragging.borrow();
        let Some(item) = dragging.as_ref() else {
            return Ok(());
        };
        let Some(parent) = self.marker.parent_node() else {
            return Ok(());
        };

        let marker: &Node = &self.marker;
        parent.insert_before(item, Some(marker))?;
        self.marker.remove();
        Ok(())
    }

    fn bind(editor: &Rc<Self>) -> Result<(), JsValue> {
        let list: &EventTarget = &editor.list;
        {
            let editor = Rc::clone(editor);
            listen(list, "dragstart", move |event: DragEvent| editor.on_drag_start(&event))?;
        }
        {
            let editor = Rc::clone(editor);
            listen(list, "dragend", move |_: Event| editor.on_drag_end())?;
        }
        {
            let editor = Rc::clone(editor);
            listen(list, "dragover", move |event: DragEvent| editor.on_drag_over(&event))?;
        }
        {
            let editor = Rc::clone(editor);
            listen(list, "drop", move |event: DragEvent| editor.on_drop(&event))?;
        }

        // 点击遮罩空白处关闭
        {
            let target = Rc::clone(editor);
            listen(&editor.overlay, "click", move |event: Event| {
                if let Some(clicked) = event.target() {
                    if Object::is(&clicked, &target.overlay) {
                        target.close();
                    }
                }
                Ok(())
            })?;
        }

        for selector in [".hybs-x", "[data-action='cancel']"] {
            let editor = Rc::clone(editor);
            listen(&query(&editor.overlay, selector)?.into(), "click", move |_: Event| {
                editor.close();
                Ok(())
            })?;
        }

        {
            let editor = Rc::clone(editor);
            listen(
                &query(&editor.overlay, "[data-action='reset']")?.into(),
                "click",
                move |_: Event| editor.render(&editor.current),
            )?;
        }
        {
            let editor = Rc::clone(editor);
            listen(
                &query(&editor.overlay, "[data-action='auto']")?.into(),
                "click",
                move |_: Event| editor.save(OrderMode::Auto, &[]),
            )?;
        }
        {
            let editor = Rc::clone(editor);
            listen(
                &query(&editor.overlay, "[data-action='save']")?.into(),
                "click",
                move |_: Event| {
                    let order = editor.current_order()?;
                    editor.save(OrderMode::Custom, &order)
                },
            )?;
        }

        Ok(())
    }
}

fn query(parent: &Element, selector: &str) -> Result<Element, JsValue> {
    parent
        .query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("missing element: {selector}")))
}

/// 事件目标所在的列表条目
fn event_item(event: &Event) -> Result<Option<Element>, JsValue> {
    match event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
        Some(target) => target.closest(ITEM_SELECTOR),
        None => Ok(None),
    }
}

fn listen<E, F>(target: &EventTarget, name: &str, handler: F) -> Result<(), JsValue>
where
    E: JsCast + 'static,
    F: Fn(E) -> Result<(), JsValue> + 'static,
{
    let closure = Closure::wrap(Box::new(move |event: JsValue| {
        if let Err(e) = handler(event.unchecked_into::<E>()) {
            console::error_1(&e);
        }
    }) as Box<dyn Fn(JsValue)>);

    target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;

    // 保持闭包生命周期
    closure.forget();
    Ok(())
}
