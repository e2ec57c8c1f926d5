//! 目录操作

use std::{path::Path, time::UNIX_EPOCH};

use walkdir::WalkDir;

use crate::error::Error;

/// 获取文件修改时间
pub fn get_mtime(path: &Path) -> Result<f64, Error> {
    let metadata = std::fs::metadata(path)?;
    let mtime = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)?
        .as_secs_f64();
    Ok(mtime)
}

/// 获取文件修改时间, 文件不存在或读取失败时返回 0.0
///
/// 用于节点指纹 (IS_CHANGED)
pub fn mtime_or_zero(path: &Path) -> f64 {
    if !path.is_file() {
        return 0.0;
    }
    get_mtime(path).unwrap_or(0.0)
}

/// 列出目录下指定扩展名的文件 (不递归), 按名称排序
///
/// 扩展名比较不区分大小写
pub fn list_files_with_extension(directory: &Path, extension: &str) -> Vec<String> {
    let extension = extension.trim_start_matches('.').to_lowercase();

    let mut files: Vec<String> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.file_name().to_str().map(|s| s.to_string()))
        .filter(|name| {
            Path::new(name)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_lowercase() == extension)
                .unwrap_or(false)
        })
        .collect();

    files.sort_unstable();
    files
}
