#![allow(dead_code)]

pub mod fixtures;

use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use stipple::{CompiledStyle, InMemoryResourceProvider, LiteralStyle, StyleCompiler, StyleError};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A compiler whose image sources resolve against `provider` only.
pub fn compiler_with(provider: InMemoryResourceProvider) -> StyleCompiler {
    StyleCompiler::builder()
        .with_resource_provider(Arc::new(provider))
        .build()
}

/// Compiles a JSON style against an empty in-memory provider.
pub fn compile(style: Value) -> Result<CompiledStyle, StyleError> {
    let style: LiteralStyle = serde_json::from_value(style)?;
    compiler_with(InMemoryResourceProvider::new()).compile(&style)
}

/// Encodes a solid-color RGBA image as PNG.
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("PNG encoding failed");
    bytes.into_inner()
}

/// Asserts that `hit` is `base` with exactly `hit_lines` inserted.
pub fn assert_hit_variant(base: &str, hit: &str, hit_lines: &[&str]) {
    let kept: Vec<&str> = hit.lines().filter(|line| !hit_lines.contains(line)).collect();
    assert_eq!(kept, base.lines().collect::<Vec<_>>());
    assert_eq!(hit.lines().count(), base.lines().count() + hit_lines.len());
}

pub fn properties(value: Value) -> stipple::FeatureProperties {
    match value {
        Value::Object(map) => map,
        other => panic!("feature properties must be an object, got {other}"),
    }
}
