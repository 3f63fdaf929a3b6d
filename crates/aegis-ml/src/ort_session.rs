//! Real ONNX Runtime-backed [`InferenceSession`], gated behind the
//! `onnx` feature so the default build (and its tests) never needs to
//! link `ort` or have a model file on disk.

use crate::error::{MlError, Result};
use crate::session::{InferenceSession, NamedTensors, Tensor};
use crate::tokenizer::TokenizedInput;
use ort::session::Session;
use std::sync::Mutex;

pub struct OrtSession {
    name: String,
    session: Mutex<Session>,
}

impl OrtSession {
    pub fn load(name: impl Into<String>, model_path: &str) -> Result<Self> {
        let session = Session::builder()
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| MlError::InferenceFailed(e.to_string()))?;
        Ok(Self {
            name: name.into(),
            session: Mutex::new(session),
        })
    }
}

impl InferenceSession for OrtSession {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn run(&self, feeds: &TokenizedInput) -> Result<NamedTensors> {
        let session = self
            .session
            .lock()
            .map_err(|_| MlError::InferenceFailed("session lock poisoned".into()))?;

        let input_ids = ort::value::Tensor::from_array((
            [1, feeds.input_ids.len()],
            feeds.input_ids.clone().into_boxed_slice(),
        ))
        .map_err(|e| MlError::InferenceFailed(e.to_string()))?;
        let attention_mask = ort::value::Tensor::from_array((
            [1, feeds.attention_mask.len()],
            feeds.attention_mask.clone().into_boxed_slice(),
        ))
        .map_err(|e| MlError::InferenceFailed(e.to_string()))?;
        let token_type_ids = ort::value::Tensor::from_array((
            [1, feeds.token_type_ids.len()],
            feeds.token_type_ids.clone().into_boxed_slice(),
        ))
        .map_err(|e| MlError::InferenceFailed(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "token_type_ids" => token_type_ids,
            ])
            .map_err(|e| MlError::InferenceFailed(e.to_string()))?;

        let mut named = NamedTensors::new();
        for (name, value) in outputs.iter() {
            if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
                named.insert(
                    name.to_string(),
                    Tensor {
                        shape: shape.iter().map(|&d| d as usize).collect(),
                        data: data.to_vec(),
                    },
                );
            }
        }
        Ok(named)
    }
}
