// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/capture.rs - 保存检测快照
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;
use tracing::warn;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum CaptureError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
}

/// 标注后的图像同时写入本次快照路径和固定的最新检测路径，格式由扩展名决定
#[derive(Debug, Clone)]
pub struct CaptureOutput {
  capture_path: PathBuf,
  latest_path: PathBuf,
}

impl CaptureOutput {
  pub fn new(capture_path: PathBuf, latest_path: PathBuf) -> Self {
    Self {
      capture_path,
      latest_path,
    }
  }

  pub fn from_config(config: &Config) -> Self {
    Self::new(config.capture_path(), config.latest_path.clone())
  }

  pub fn latest_path(&self) -> &Path {
    &self.latest_path
  }

  pub fn save(&self, image: &RgbImage) -> Result<(), CaptureError> {
    save_image(&self.capture_path, image)?;
    save_image(&self.latest_path, image)
  }
}

fn save_image(path: &Path, image: &RgbImage) -> Result<(), CaptureError> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }

  image.save(path)?;
  warn!("保存图像到文件: {}", path.display());

  Ok(())
}
