//! Request and response envelopes.
//!
//! On the wire a request looks like
//! `{"type": "compress", "data": {...}, "taskId": 7}` and a response like
//! `{"success": true, "data": {...}, "taskId": 7}` or
//! `{"success": false, "error": "...", "taskId": 7}`.

use crate::imaging::{
    BackendError, CompressOutput, CompressParams, ResizeOutput, ResizeParams, ThumbnailOutput,
    ThumbnailParams,
};
use crate::inpaint::{InpaintError, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::handler::WorkerKind;

pub type TaskId = u64;

fn default_inpaint_method() -> String {
    "telea".to_string()
}

fn default_remove_method() -> String {
    "content-aware".to_string()
}

/// Payload of an `inpaint` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InpaintParams {
    pub image_data: String,
    /// RGBA bytes; alpha > 0 marks a pixel for filling.
    pub mask_data: Vec<u8>,
    #[serde(default = "default_inpaint_method")]
    pub method: String,
}

/// Payload of a `removeObject` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveObjectParams {
    pub image_data: String,
    pub selection: Vec<u8>,
    #[serde(default = "default_remove_method")]
    pub method: String,
}

/// Payload of a `healSelection` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealParams {
    pub image_data: String,
    /// RGBA bytes; alpha is the blend strength.
    pub selection: Vec<u8>,
    pub source_point: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InpaintOutput {
    pub inpainted_data: String,
    pub width: u32,
    pub height: u32,
    /// The method name as requested.
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealOutput {
    pub healed_data: String,
    pub width: u32,
    pub height: u32,
}

/// Everything a worker can be asked to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Operation {
    Compress(CompressParams),
    Resize(ResizeParams),
    Thumbnail(ThumbnailParams),
    Inpaint(InpaintParams),
    RemoveObject(RemoveObjectParams),
    HealSelection(HealParams),
}

impl Operation {
    /// Wire name, as used in the `type` field.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Compress(_) => "compress",
            Operation::Resize(_) => "resize",
            Operation::Thumbnail(_) => "thumbnail",
            Operation::Inpaint(_) => "inpaint",
            Operation::RemoveObject(_) => "removeObject",
            Operation::HealSelection(_) => "healSelection",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    #[serde(flatten)]
    pub operation: Operation,
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
}

/// Successful result payload. Serialised without a tag; the field names
/// identify the operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskOutput {
    Compress(CompressOutput),
    Resize(ResizeOutput),
    Thumbnail(ThumbnailOutput),
    Inpaint(InpaintOutput),
    Heal(HealOutput),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TaskOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
}

impl TaskResponse {
    pub fn ok(task_id: TaskId, output: TaskOutput) -> Self {
        Self {
            success: true,
            data: Some(output),
            error: None,
            task_id,
        }
    }

    pub fn failed(task_id: TaskId, error: &TaskError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            task_id,
        }
    }
}

/// Failure inside a handler. Reported to the caller as a `success: false`
/// envelope, not as a pool error.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Inpaint(#[from] InpaintError),
    #[error("Unsupported operation for {kind} worker: {operation}")]
    Unsupported {
        kind: WorkerKind,
        operation: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::OutputFormat;
    use serde_json::json;

    #[test]
    fn request_envelope_shape() {
        let request: TaskRequest = serde_json::from_value(json!({
            "type": "compress",
            "data": {"imageData": "data:image/png;base64,AA==", "quality": 0.5, "maxWidth": 100},
            "taskId": 42
        }))
        .unwrap();

        assert_eq!(request.task_id, 42);
        let Operation::Compress(params) = &request.operation else {
            panic!("expected compress, got {}", request.operation.name());
        };
        assert_eq!(params.quality, 0.5);
        assert_eq!(params.max_width, Some(100));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], "compress");
        assert_eq!(value["taskId"], 42);
        assert_eq!(value["data"]["maxWidth"], 100);
    }

    #[test]
    fn camel_case_operation_names() {
        let request: TaskRequest = serde_json::from_value(json!({
            "type": "healSelection",
            "data": {"imageData": "x", "selection": [0, 0, 0, 255], "sourcePoint": {"x": 1.0, "y": 2.0}},
            "taskId": 1
        }))
        .unwrap();
        assert_eq!(request.operation.name(), "healSelection");

        let request: TaskRequest = serde_json::from_value(json!({
            "type": "removeObject",
            "data": {"imageData": "x", "selection": []},
            "taskId": 2
        }))
        .unwrap();
        let Operation::RemoveObject(params) = request.operation else {
            panic!("expected removeObject");
        };
        assert_eq!(params.method, "content-aware");
    }

    #[test]
    fn inpaint_defaults_to_telea() {
        let params: InpaintParams =
            serde_json::from_value(json!({"imageData": "x", "maskData": [1, 2, 3, 4]})).unwrap();
        assert_eq!(params.method, "telea");
        assert_eq!(params.mask_data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn success_response_shape() {
        let response = TaskResponse::ok(
            9,
            TaskOutput::Heal(HealOutput {
                healed_data: "data:image/png;base64,".into(),
                width: 3,
                height: 4,
            }),
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "data": {"healedData": "data:image/png;base64,", "width": 3, "height": 4},
                "taskId": 9
            })
        );

        let back: TaskResponse = serde_json::from_value(value).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn failure_response_shape() {
        let err = TaskError::Unsupported {
            kind: WorkerKind::Compress,
            operation: "inpaint",
        };
        let value = serde_json::to_value(TaskResponse::failed(3, &err)).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": "Unsupported operation for compress worker: inpaint",
                "taskId": 3
            })
        );
    }

    #[test]
    fn untagged_output_picks_matching_variant() {
        let output: TaskOutput = serde_json::from_value(json!({
            "compressedData": "d", "originalSize": 10, "compressedSize": 5,
            "width": 1, "height": 1, "format": "webp", "quality": 0.8
        }))
        .unwrap();
        let TaskOutput::Compress(out) = output else {
            panic!("expected compress output");
        };
        assert_eq!(out.format, OutputFormat::Webp);
    }
}
