// 该文件是 Shanan （山南西风） 项目的一部分。
// src/device/unavailable.rs - 无加速器后端
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

use std::{convert::Infallible, time::Duration};

use thiserror::Error;
use tracing::warn;

use crate::{
  device::{Accelerator, DeviceHandle, OutputTensor},
  frame::F16NhwcTensor,
};

#[derive(Error, Debug)]
pub enum UnavailableError {
  #[error("当前构建未启用任何加速器后端，无法打开设备 {0}")]
  NoBackend(String),
}

/// 未启用加速器后端时使用，枚举结果总是为空
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

impl Accelerator for Unavailable {
  type Device = Infallible;
  type Graph = Infallible;
  type Error = UnavailableError;

  fn enumerate(&self) -> Result<Vec<DeviceHandle>, Self::Error> {
    warn!("当前构建未启用加速器后端（可启用 rknpu 特性）");
    Ok(Vec::new())
  }

  fn open(&self, handle: &DeviceHandle) -> Result<Self::Device, Self::Error> {
    Err(UnavailableError::NoBackend(handle.name.clone()))
  }

  fn load_graph(&self, device: &mut Self::Device, _blob: &[u8]) -> Result<Self::Graph, Self::Error> {
    match *device {}
  }

  fn infer(
    &self,
    graph: &Self::Graph,
    _tensor: &F16NhwcTensor,
  ) -> Result<(OutputTensor, Duration), Self::Error> {
    match *graph {}
  }

  fn deallocate(&self, graph: Self::Graph) -> Result<(), Self::Error> {
    match graph {}
  }

  fn close(&self, device: Self::Device) -> Result<(), Self::Error> {
    match device {}
  }
}
