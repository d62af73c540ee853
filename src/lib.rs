pub mod analysis;
pub mod cache_common;
pub mod color_utils;
pub mod confidence;
pub mod config;
pub mod detection_obj;
pub mod detector;
pub mod domain;
pub mod error;
pub mod image_input;
pub mod image_source;
pub mod interventions;
pub mod onnx_session;
pub mod output_manager;
pub mod pipeline;
pub mod report;
pub mod response;
pub mod scoring;
pub mod shared_metadata;
pub mod simulation;
pub mod stubs;
pub mod yolo_postprocessing;
pub mod yolo_preprocessing;
