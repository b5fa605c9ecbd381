//! # gymshot-vision
//!
//! Abstraction over hosted multimodal models. A request is one user turn made
//! of a text prompt plus base64-encoded images; the reply is the model's text.

pub mod mock;
pub mod openai;
pub mod provider;

pub use mock::MockVisionProvider;
pub use openai::OpenAiCompatProvider;
pub use provider::{EncodedImage, Usage, VisionProvider, VisionRequest, VisionResponse};
