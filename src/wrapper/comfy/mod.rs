//! comfy 宿主模块封装

pub mod folder_paths;
pub mod lora_loaders;
