//! HYBS 节点的前端扩展

use wasm_bindgen::{prelude::wasm_bindgen, JsValue};
use web_sys::console;

pub mod comfy;
pub mod group_bypasser;

use comfy::{ComfyApp, Extension};
use group_bypasser::{cascade::PANEL_CLASS, GroupBypasserPanel};

/// 扩展名称
pub const EXTENSION_NAME: &str = "HYBS.GroupBypasser.PanelOnly";

#[wasm_bindgen(start)]
fn run() -> Result<(), JsValue> {
    let mut extension = Extension::new(EXTENSION_NAME);

    extension.before_register_node_def(|node_type, node_name| {
        if node_name == PANEL_CLASS {
            GroupBypasserPanel::install(&node_type)?;
        }
        Ok(())
    })?;

    ComfyApp::new().register_extension(&extension)?;

    console::log_1(&format!("{EXTENSION_NAME} registered").into());
    Ok(())
}
