// 该文件是 Shanan （山南西风） 项目的一部分。
// src/device.rs - 加速器设备会话
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

use std::{error::Error as StdError, path::Path, time::Duration};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::frame::F16NhwcTensor;

#[cfg(feature = "rknpu")]
mod rockchip;
#[cfg(feature = "rknpu")]
pub use self::rockchip::{RknpuAccelerator, RknpuError};

mod unavailable;
pub use self::unavailable::{Unavailable, UnavailableError};

/// 当前构建默认使用的加速器后端
#[cfg(feature = "rknpu")]
pub type DefaultAccelerator = RknpuAccelerator;
#[cfg(not(feature = "rknpu"))]
pub type DefaultAccelerator = Unavailable;

/// 枚举得到的设备标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
  pub name: String,
}

impl DeviceHandle {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }
}

/// 输出张量的元素类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
  Float16,
  Float32,
}

impl ElementType {
  pub const fn width(self) -> usize {
    match self {
      ElementType::Float16 => 2,
      ElementType::Float32 => 4,
    }
  }
}

/// 驱动返回的原始输出，小端字节序
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTensor {
  element_type: ElementType,
  data: Box<[u8]>,
}

impl OutputTensor {
  pub fn new(element_type: ElementType, data: Vec<u8>) -> Self {
    Self {
      element_type,
      data: data.into_boxed_slice(),
    }
  }

  pub fn from_f16(values: &[half::f16]) -> Self {
    let data = values.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<_>>();
    Self::new(ElementType::Float16, data)
  }

  pub fn from_f32(values: &[f32]) -> Self {
    let data = values.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<_>>();
    Self::new(ElementType::Float32, data)
  }

  pub fn element_type(&self) -> ElementType {
    self.element_type
  }

  /// 完整元素个数，末尾不足一个元素的字节被忽略
  pub fn len(&self) -> usize {
    self.data.len() / self.element_type.width()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn get(&self, index: usize) -> Option<f32> {
    let width = self.element_type.width();
    let offset = index.checked_mul(width)?;
    let bytes = self.data.get(offset..offset.checked_add(width)?)?;
    match self.element_type {
      ElementType::Float16 => Some(half::f16::from_le_bytes([bytes[0], bytes[1]]).to_f32()),
      ElementType::Float32 => Some(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
    }
  }
}

/// 加速器驱动。设备与图句柄由调用方持有，释放顺序由 [`Session`] 保证
pub trait Accelerator {
  type Device;
  type Graph;
  type Error: StdError + Send + Sync + 'static;

  fn enumerate(&self) -> Result<Vec<DeviceHandle>, Self::Error>;
  fn open(&self, handle: &DeviceHandle) -> Result<Self::Device, Self::Error>;
  fn load_graph(&self, device: &mut Self::Device, blob: &[u8]) -> Result<Self::Graph, Self::Error>;
  /// 返回输出张量以及驱动统计的推理耗时
  fn infer(
    &self,
    graph: &Self::Graph,
    tensor: &F16NhwcTensor,
  ) -> Result<(OutputTensor, Duration), Self::Error>;
  fn deallocate(&self, graph: Self::Graph) -> Result<(), Self::Error>;
  fn close(&self, device: Self::Device) -> Result<(), Self::Error>;
}

#[derive(Error, Debug)]
pub enum SessionError {
  #[error("未找到加速器设备")]
  NoDevice,
  #[error("图文件读取错误: {0}")]
  GraphRead(#[from] std::io::Error),
  #[error("加速器错误: {0}")]
  Accelerator(#[source] Box<dyn StdError + Send + Sync>),
  #[error("会话已关闭")]
  Closed,
}

impl SessionError {
  fn accelerator<E: StdError + Send + Sync + 'static>(err: E) -> Self {
    SessionError::Accelerator(Box::new(err))
  }
}

/// 已打开的设备及其上加载的图；drop 时先释放图再关闭设备
pub struct Session<'a, A: Accelerator> {
  accelerator: &'a A,
  handle: DeviceHandle,
  device: Option<A::Device>,
  graph: Option<A::Graph>,
}

impl<'a, A: Accelerator> Session<'a, A> {
  /// 打开第一个枚举到的设备并加载图文件。没有设备时不会读取图文件
  pub fn open(accelerator: &'a A, graph_path: &Path) -> Result<Self, SessionError> {
    let devices = accelerator.enumerate().map_err(SessionError::accelerator)?;
    debug!("枚举到 {} 个加速器设备", devices.len());
    let handle = devices.into_iter().next().ok_or(SessionError::NoDevice)?;

    info!("打开加速器设备: {}", handle.name);
    let mut device = accelerator.open(&handle).map_err(SessionError::accelerator)?;

    let loaded = std::fs::read(graph_path)
      .map_err(SessionError::from)
      .and_then(|blob| {
        info!("加载图文件: {}", graph_path.display());
        debug!(
          "图文件大小: {:.2} MB",
          blob.len() as f64 / (1024.0 * 1024.0)
        );
        accelerator
          .load_graph(&mut device, &blob)
          .map_err(SessionError::accelerator)
      });

    let graph = match loaded {
      Ok(graph) => graph,
      Err(err) => {
        error!("图加载失败，关闭设备 {}: {}", handle.name, err);
        if let Err(close_err) = accelerator.close(device) {
          warn!("关闭设备失败: {}", close_err);
        }
        return Err(err);
      }
    };
    info!("图加载完成");

    Ok(Session {
      accelerator,
      handle,
      device: Some(device),
      graph: Some(graph),
    })
  }

  pub fn handle(&self) -> &DeviceHandle {
    &self.handle
  }

  pub fn infer(&self, tensor: &F16NhwcTensor) -> Result<(OutputTensor, Duration), SessionError> {
    let graph = self.graph.as_ref().ok_or(SessionError::Closed)?;
    self
      .accelerator
      .infer(graph, tensor)
      .map_err(SessionError::accelerator)
  }

  /// 释放图并关闭设备，重复调用无副作用
  pub fn close(&mut self) -> Result<(), SessionError> {
    let graph_result = match self.graph.take() {
      Some(graph) => self.accelerator.deallocate(graph),
      None => Ok(()),
    };
    let device_result = match self.device.take() {
      Some(device) => {
        debug!("关闭加速器设备: {}", self.handle.name);
        self.accelerator.close(device)
      }
      None => Ok(()),
    };
    graph_result
      .and(device_result)
      .map_err(SessionError::accelerator)
  }
}

impl<A: Accelerator> Drop for Session<'_, A> {
  fn drop(&mut self) {
    if let Err(err) = self.close() {
      error!("释放加速器会话失败: {}", err);
    }
  }
}
