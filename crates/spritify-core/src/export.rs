use crate::export_css::css_class_name;
use crate::model::Sheet;
use serde::Serialize;
use serde_json::{Value, json};

/// Serialize the sheet as `{ width, height, sprites: [...], meta }`, sprites in packing order.
pub fn to_json_array<K: ToString + Serialize>(sheet: &Sheet<K>) -> Value {
    let sprites: Vec<Value> = sheet
        .sprites
        .iter()
        .map(|s| {
            let key = s.key.to_string();
            json!({
                "cssClass": css_class_name(&key),
                "key": key,
                "frame": {"x": s.frame.x, "y": s.frame.y, "w": s.frame.w, "h": s.frame.h},
            })
        })
        .collect();
    json!({
        "width": sheet.width,
        "height": sheet.height,
        "sprites": sprites,
        "meta": &sheet.meta,
    })
}

/// Flatten sprites keyed by name.
/// Shape: `{ frames: { name: { frame, sourceSize, cssClass } }, size, meta }`.
pub fn to_json_hash<K: ToString>(sheet: &Sheet<K>) -> Value {
    let mut frames = serde_json::Map::new();
    for s in &sheet.sprites {
        let key = s.key.to_string();
        frames.insert(
            key.clone(),
            json!({
                "frame": {"x": s.frame.x, "y": s.frame.y, "w": s.frame.w, "h": s.frame.h},
                "sourceSize": {"w": s.frame.w, "h": s.frame.h},
                "cssClass": css_class_name(&key),
            }),
        );
    }
    json!({
        "frames": frames,
        "size": {"w": sheet.width, "h": sheet.height},
        "meta": &sheet.meta,
    })
}
