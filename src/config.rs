// 该文件是 Shanan （山南西风） 项目的一部分。
// src/config.rs - 运行配置
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

use std::{
  ffi::OsStr,
  path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{args::Args, preprocess::ColorOrder, task::ExitPolicy};

pub const DEFAULT_THRESHOLD_PERCENT: u8 = 60;

const MEAN_CHANNELS: usize = 3;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("均值需要 3 个分量，实际为 {0}")]
  MeanArity(usize),
  #[error("输入尺寸需要 2 个分量（宽 高），实际为 {0}")]
  DimArity(usize),
  #[error("输入尺寸不能为零: {0}x{1}")]
  ZeroDim(u32, u32),
  #[error("无法获取当前工作目录: {0}")]
  CurrentDir(#[from] std::io::Error),
}

/// 一次运行的完整配置，启动时构建一次，之后只读
#[derive(Debug, Clone)]
pub struct Config {
  pub graph: PathBuf,
  pub video: u32,
  pub labels: PathBuf,
  pub mean: [f32; 3],
  pub scale: f32,
  /// (宽, 高)
  pub dims: (u32, u32),
  pub color_order: ColorOrder,
  /// 已基于工作目录解析的输入图像路径
  pub image: PathBuf,
  pub threshold_percent: u8,
  pub captures_dir: PathBuf,
  pub latest_path: PathBuf,
  pub font: Option<PathBuf>,
  pub exit_policy: ExitPolicy,
}

impl Config {
  /// 以 `cwd` 为基准解析相对路径
  pub fn from_args_in(args: Args, cwd: &Path) -> Result<Self, ConfigError> {
    let mean: [f32; MEAN_CHANNELS] = args
      .mean
      .as_slice()
      .try_into()
      .map_err(|_| ConfigError::MeanArity(args.mean.len()))?;

    let (width, height) = match args.dim.as_slice() {
      &[width, height] => (width, height),
      other => return Err(ConfigError::DimArity(other.len())),
    };
    if width == 0 || height == 0 {
      return Err(ConfigError::ZeroDim(width, height));
    }

    let image = cwd.join(args.image.unwrap_or_default());

    Ok(Config {
      graph: args.graph,
      video: args.video,
      labels: args.labels,
      mean,
      scale: args.scale,
      dims: (width, height),
      color_order: args.color_mode,
      image,
      threshold_percent: args.threshold,
      captures_dir: args.captures_dir,
      latest_path: args.latest,
      font: args.font,
      exit_policy: args.exit_policy,
    })
  }

  /// 置信度阈值，范围 [0, 1]
  pub fn threshold(&self) -> f32 {
    f32::from(self.threshold_percent) / 100.0
  }

  pub fn threshold_modified(&self) -> bool {
    self.threshold_percent != DEFAULT_THRESHOLD_PERCENT
  }

  /// 本次运行的快照路径：快照目录下与输入图像同名的文件
  pub fn capture_path(&self) -> PathBuf {
    let name = self
      .image
      .file_name()
      .unwrap_or_else(|| OsStr::new("capture.jpg"));
    self.captures_dir.join(name)
  }
}

impl TryFrom<Args> for Config {
  type Error = ConfigError;

  fn try_from(args: Args) -> Result<Self, Self::Error> {
    let cwd = std::env::current_dir()?;
    Self::from_args_in(args, &cwd)
  }
}
