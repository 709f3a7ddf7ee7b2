// 该文件是 Shanan （山南西风） 项目的一部分。
// src/main.rs - 项目主程序
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

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use shanan_sentry::{
  args::Args,
  config::Config,
  device::DefaultAccelerator,
  task::{self, Outcome},
};

fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  let config = Config::try_from(args)?;

  info!("图文件路径: {}", config.graph.display());
  info!("标签文件路径: {}", config.labels.display());
  info!("输入图像: {}", config.image.display());
  info!("置信度阈值: {}%", config.threshold_percent);

  let accelerator = DefaultAccelerator::default();
  let outcome = task::run(&config, &accelerator)?;
  if outcome == Outcome::Detected {
    info!("快照已保存: {}", config.capture_path().display());
  }

  Ok(outcome.into())
}
