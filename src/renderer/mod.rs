//! Descriptor renderer producing Godot `AtlasTexture` resources
//!
//! This module turns one atlas record plus the batch's shared texture into the
//! text of a `.tres` file.

pub mod config;
pub mod tres;

pub use config::{TextureRef, TresConfig};
pub use tres::{output_base_name, render, GeneratedDescriptor};
