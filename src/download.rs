//! 模型获取：通过HTTP流式下载模型文件

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// 模型发布页面
pub const RELEASES_PAGE: &str = "https://github.com/AviMath2412/NeuroScan-AI/releases";

/// 默认模型下载地址
pub const DEFAULT_MODEL_URL: &str =
    "https://github.com/AviMath2412/NeuroScan-AI/releases/download/v1.0/best_model.onnx";

/// 进度回调：`(已下载字节数, 总字节数)`
pub type ProgressCallback = Box<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// 下载结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// 目标文件已存在，未发起下载
    AlreadyPresent,
    /// 下载完成
    Downloaded { bytes: u64 },
}

/// 下载 `url` 到 `dest`，目标已存在时跳过
///
/// 响应体逐块写入磁盘；下载失败时删除未完成的文件。
///
/// # Errors
///
/// 请求失败、服务端返回非成功状态或文件写入失败时返回错误。
pub async fn download_model(
    url: &str,
    dest: &Path,
    progress: Option<&ProgressCallback>,
) -> Result<DownloadOutcome> {
    if dest.exists() {
        debug!("Model file {} already exists", dest.display());
        return Ok(DownloadOutcome::AlreadyPresent);
    }

    info!("Downloading model from {}", url);

    match fetch_to_file(url, dest, progress).await {
        Ok(bytes) => {
            info!("Downloaded {} ({} bytes)", dest.display(), bytes);
            Ok(DownloadOutcome::Downloaded { bytes })
        }
        Err(e) => {
            if dest.exists() {
                if let Err(cleanup) = tokio::fs::remove_file(dest).await {
                    warn!(
                        "Failed to remove partial model file {}: {}",
                        dest.display(),
                        cleanup
                    );
                }
            }
            Err(e)
        }
    }
}

async fn fetch_to_file(url: &str, dest: &Path, progress: Option<&ProgressCallback>) -> Result<u64> {
    let mut response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to request {url}"))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status: {}", response.status());
    }

    let total = response.content_length();
    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("Failed to create {}", dest.display()))?;

    let mut downloaded: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .context("Failed to read response body")?
    {
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        downloaded += chunk.len() as u64;

        if let Some(cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().await?;
    Ok(downloaded)
}

/// 下载失败时输出的手动下载步骤
#[must_use]
pub fn manual_instructions(filename: &str) -> String {
    format!(
        "Manual download instructions:\n\
         1. Go to: {RELEASES_PAGE}\n\
         2. Download the model file\n\
         3. Place it as '{filename}' in the project root"
    )
}
