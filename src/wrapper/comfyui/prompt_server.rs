//! Prompt Server
//!
//! 节点异常通过 `PromptServer.instance.send_sync` 推送到前端,
//! 前端监听 `hybs` 事件展示错误

use pyo3::{
    types::{PyAnyMethods, PyDict, PyDictMethods, PyModule},
    PyResult, PyTypeInfo, Python,
};

/// 前端事件名称
pub const EVENT_NAME: &str = "hybs";

/// comfyui PromptServer wrapper
///
/// 不依赖节点实例, INPUT_TYPES 等类方法中同样可以上报
pub trait PromptServer: PyTypeInfo {
    /// 发送错误信息到ComfyUI前端
    fn send_error(py: Python, error_type: &str, message: &str) -> PyResult<()> {
        // 仅在 ComfyUI 进程内存在
        let server = PyModule::import(py, "server")?
            .getattr("PromptServer")?
            .getattr("instance")?;

        let error_data = PyDict::new(py);
        error_data.set_item("type", error_type)?;
        error_data.set_item("node", Self::class_name(py)?)?;
        error_data.set_item("message", message)?;

        server
            .getattr("send_sync")?
            .call1((EVENT_NAME, error_data))?;

        Ok(())
    }

    /// Class 名称
    fn class_name(py: Python) -> PyResult<String> {
        Self::type_object(py)
            .getattr("__name__")?
            .extract::<String>()
    }
}
