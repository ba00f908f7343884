use crate::model::Manifest;
use serde_json::{Value, json};

/// Serialize the manifest as `{ w, h, n, textures: [ { n, x, y, w, h } ] }`.
/// Textures appear in input order; coordinates are the visible rect.
pub fn to_json(manifest: &Manifest) -> Value {
    let textures: Vec<Value> = manifest
        .textures
        .iter()
        .map(|t| json!({"n": t.n, "x": t.x, "y": t.y, "w": t.w, "h": t.h}))
        .collect();
    json!({
        "w": manifest.w,
        "h": manifest.h,
        "n": manifest.n,
        "textures": textures,
    })
}

/// Frames keyed by name: `{ size: {w, h}, frames: { name: {x, y, w, h} } }`.
/// Later entries win when two textures share a name.
pub fn to_json_hash(manifest: &Manifest) -> Value {
    let mut frames = serde_json::Map::new();
    for t in &manifest.textures {
        frames.insert(
            t.n.clone(),
            json!({"x": t.x, "y": t.y, "w": t.w, "h": t.h}),
        );
    }
    json!({
        "size": {"w": manifest.w, "h": manifest.h},
        "frames": frames,
    })
}
