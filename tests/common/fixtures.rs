use serde_json::{Value, json};

/// The smallest valid style: a white square of size 1.
pub fn minimal_style(symbol_type: &str) -> Value {
    json!({ "symbol": { "symbolType": symbol_type } })
}

/// Circles sized and colored by feature properties, filtered by a variable.
pub fn population_style() -> Value {
    json!({
        "filter": [">", ["get", "population"], ["var", "minPopulation"]],
        "variables": { "minPopulation": 10000 },
        "symbol": {
            "symbolType": "circle",
            "size": ["interpolate", ["linear"], ["get", "population"], 10000, 8, 2000000, 28],
            "color": ["interpolate", ["linear"], ["get", "population"], 10000, "#ff0000", 2000000, "#0000ff"],
            "opacity": 0.8,
            "rotateWithView": false
        }
    })
}

/// Squares colored by a category property, showing only the selected category.
pub fn category_style() -> Value {
    json!({
        "filter": ["==", ["get", "kind"], ["var", "selected"]],
        "variables": { "selected": "road" },
        "symbol": {
            "symbolType": "square",
            "size": 6,
            "color": ["match", ["get", "kind"], "road", "#ff8800", "rail", "#444444", "#cccccc"]
        }
    })
}

/// A triangle whose color is driven by a per-feature speed.
pub fn speed_style() -> Value {
    json!({
        "symbol": {
            "symbolType": "triangle",
            "size": 12,
            "color": ["interpolate", ["linear"], ["get", "speed"], 0, "green", 100, "red"],
            "rotation": ["*", ["get", "heading"], 0.0174533]
        }
    })
}

pub fn image_style(src: &str) -> Value {
    json!({
        "symbol": {
            "symbolType": "image",
            "src": src,
            "size": [16, 16],
            "textureCoord": [0, 0, 0.5, 0.5],
            "rotateWithView": true
        }
    })
}
