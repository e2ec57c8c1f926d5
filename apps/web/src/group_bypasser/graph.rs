//! 通过 Reflect 读取 LGraph, 实现 [`GroupGraph`]

use js_sys::{Array, Function, Map, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::console;

use super::cascade::{GroupGraph, NodeId};
use crate::comfy::ComfyApp;

/// app.graph
pub struct JsGraph {
    graph: JsValue,
    groups: Array,
}

impl JsGraph {
    pub fn new(graph: JsValue) -> Self {
        let groups = Reflect::get(&graph, &"_groups".into())
            .ok()
            .and_then(|groups| groups.dyn_into::<Array>().ok())
            .unwrap_or_else(Array::new);
        Self { graph, groups }
    }

    pub fn from_app(app: &ComfyApp) -> Result<Self, JsValue> {
        Ok(Self::new(app.graph()?))
    }

    /// 分组对象
    pub fn group(&self, index: usize) -> JsValue {
        self.groups.get(index as u32)
    }

    /// 分组对象在当前画布中的下标, 已删除的分组为 None
    pub fn group_index(&self, group: &JsValue) -> Option<usize> {
        self.groups
            .iter()
            .position(|item| Object::is(&item, group))
    }

    fn node_by_id(&self, id: NodeId) -> Option<JsValue> {
        let func = Reflect::get(&self.graph, &"getNodeById".into())
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        let node = func.call1(&self.graph, &JsValue::from_f64(id as f64)).ok()?;
        node.is_object().then_some(node)
    }

    /// graph.links 可能是普通对象或 Map
    fn link(&self, link_id: &JsValue) -> Option<JsValue> {
        let links = Reflect::get(&self.graph, &"links".into()).ok()?;
        let link = match links.dyn_ref::<Map>() {
            Some(map) => map.get(link_id),
            None if links.is_object() => Reflect::get(&links, link_id).ok()?,
            None => return None,
        };
        link.is_object().then_some(link)
    }
}

fn node_id(node: &JsValue) -> Option<NodeId> {
    Reflect::get(node, &"id".into())
        .ok()?
        .as_f64()
        .map(|id| id as NodeId)
}

impl GroupGraph for JsGraph {
    fn group_count(&self) -> usize {
        self.groups.length() as usize
    }

    fn group_title(&self, group: usize) -> Option<String> {
        Reflect::get(&self.group(group), &"title".into())
            .ok()?
            .as_string()
    }

    fn group_nodes(&self, group: usize) -> Vec<NodeId> {
        let group = self.group(group);
        if !group.is_object() {
            return Vec::new();
        }

        // 节点可能被拖入拖出, 每次读取前重新计算
        if let Ok(recompute) = Reflect::get(&group, &"recomputeInsideNodes".into())
            .and_then(|func| func.dyn_into::<Function>())
        {
            let _ = recompute.call0(&group);
        }

        Reflect::get(&group, &"_nodes".into())
            .ok()
            .and_then(|nodes| nodes.dyn_into::<Array>().ok())
            .map(|nodes| nodes.iter().filter_map(|node| node_id(&node)).collect())
            .unwrap_or_default()
    }

    fn node_class(&self, node: NodeId) -> Option<String> {
        let node = self.node_by_id(node)?;
        Reflect::get(&node, &"comfyClass".into()).ok()?.as_string()
    }

    fn node_mode(&self, node: NodeId) -> Option<i64> {
        let node = self.node_by_id(node)?;
        Reflect::get(&node, &"mode".into())
            .ok()?
            .as_f64()
            .map(|mode| mode as i64)
    }

    fn set_node_mode(&mut self, node: NodeId, mode: i64) {
        let Some(node) = self.node_by_id(node) else {
            return;
        };
        if let Err(e) = Reflect::set(&node, &"mode".into(), &JsValue::from_f64(mode as f64)) {
            console::error_2(&"set node mode failed".into(), &e);
        }
    }

    fn output_targets(&self, node: NodeId, slot: usize) -> Vec<NodeId> {
        let Some(node) = self.node_by_id(node) else {
            return Vec::new();
        };
        let link_ids = Reflect::get(&node, &"outputs".into())
            .and_then(|outputs| Reflect::get(&outputs, &JsValue::from_f64(slot as f64)))
            .and_then(|output| Reflect::get(&output, &"links".into()))
            .ok()
            .and_then(|links| links.dyn_into::<Array>().ok());
        let Some(link_ids) = link_ids else {
            return Vec::new();
        };

        link_ids
            .iter()
            .filter_map(|link_id| self.link(&link_id))
            .filter_map(|link| Reflect::get(&link, &"target_id".into()).ok()?.as_f64())
            .map(|id| id as NodeId)
            .filter(|&id| self.node_by_id(id).is_some())
            .collect()
    }
}
