// 该文件是 Shanan （山南西风） 项目的一部分。
// src/device/rockchip.rs - RKNPU 加速器后端
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

use std::{path::Path, time::{Duration, Instant}};

use rknpu::{Context, InitFlags, TensorFormat, TensorType};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
  device::{Accelerator, DeviceHandle, OutputTensor},
  frame::F16NhwcTensor,
};

/// RKNPU 驱动暴露的设备节点，存在即视为设备可用
const RKNPU_DEVICE_NODES: [&str; 2] = ["/dev/rknpu", "/sys/kernel/debug/rknpu"];

const SSD_NUM_INPUTS: u32 = 1;
const SSD_OUTPUT_INDEX: usize = 0;

#[derive(Error, Debug)]
pub enum RknpuError {
  #[error("RKNN 错误: {0}")]
  RknnError(#[from] rknpu::Error),
  #[error("设备节点不存在: {0}")]
  DeviceMissing(String),
  #[error("模型无效: {0}, 错误: {1}")]
  ModelInvalid(String, rknpu::Error),
}

impl RknpuError {
  pub fn invalid(msg: &str, e: rknpu::Error) -> Self {
    RknpuError::ModelInvalid(msg.to_string(), e)
  }
}

#[derive(Debug, Default)]
pub struct RknpuAccelerator;

pub struct RknpuDevice {
  handle: DeviceHandle,
}

pub struct RknpuGraph {
  context: Context,
}

impl Accelerator for RknpuAccelerator {
  type Device = RknpuDevice;
  type Graph = RknpuGraph;
  type Error = RknpuError;

  fn enumerate(&self) -> Result<Vec<DeviceHandle>, Self::Error> {
    Ok(
      RKNPU_DEVICE_NODES
        .iter()
        .filter(|node| Path::new(node).exists())
        .map(|node| DeviceHandle::new(*node))
        .collect(),
    )
  }

  fn open(&self, handle: &DeviceHandle) -> Result<Self::Device, Self::Error> {
    if !Path::new(&handle.name).exists() {
      return Err(RknpuError::DeviceMissing(handle.name.clone()));
    }
    Ok(RknpuDevice {
      handle: handle.clone(),
    })
  }

  fn load_graph(&self, device: &mut Self::Device, blob: &[u8]) -> Result<Self::Graph, Self::Error> {
    info!("在 {} 上创建 RKNN 推理上下文", device.handle.name);
    let context = Context::new(blob, InitFlags::default())?;

    match context.sdk_version() {
      Ok(version) => {
        if let Ok(api_ver) = version.api_version() {
          debug!("模型 API 版本: {}", api_ver);
        }
        if let Ok(drv_ver) = version.driver_version() {
          debug!("模型驱动版本: {}", drv_ver);
        }
      }
      Err(e) => {
        error!("查询 SDK 版本失败: {}", e);
        return Err(RknpuError::invalid("无法查询 SDK 版本", e));
      }
    }

    let num_inputs = context
      .num_inputs()
      .map_err(|e| RknpuError::invalid("无法获取输入数量", e))?;
    if num_inputs != SSD_NUM_INPUTS {
      error!("预期模型输入数量为 {}, 实际为 {}", SSD_NUM_INPUTS, num_inputs);
      return Err(RknpuError::invalid(
        &format!("预期模型输入数量为 {}, 实际为 {}", SSD_NUM_INPUTS, num_inputs),
        rknpu::Error::InvalidModel,
      ));
    }

    Ok(RknpuGraph { context })
  }

  fn infer(
    &self,
    graph: &Self::Graph,
    tensor: &F16NhwcTensor,
  ) -> Result<(OutputTensor, Duration), Self::Error> {
    debug!("设置模型输入 {:?}", tensor.shape());
    graph.context.set_input(
      0,
      &tensor.to_le_bytes(),
      TensorFormat::NHWC,
      TensorType::Float16,
    )?;

    debug!("执行模型推理");
    let now = Instant::now();
    graph.context.run()?;
    let elapsed = now.elapsed();

    let outputs = graph.context.get_outputs()?;
    let data = outputs.get_f32(SSD_OUTPUT_INDEX)?;
    Ok((OutputTensor::from_f32(&data), elapsed))
  }

  fn deallocate(&self, graph: Self::Graph) -> Result<(), Self::Error> {
    drop(graph.context);
    Ok(())
  }

  fn close(&self, device: Self::Device) -> Result<(), Self::Error> {
    debug!("释放设备 {}", device.handle.name);
    Ok(())
  }
}
