//! The declarative style description for point symbols.
//!
//! Styles are usually written as JSON:
//!
//! ```json
//! {
//!   "filter": [">", ["get", "population"], ["var", "minPopulation"]],
//!   "variables": { "minPopulation": 10000 },
//!   "symbol": {
//!     "symbolType": "circle",
//!     "size": ["interpolate", ["linear"], ["get", "population"], 10000, 8, 2000000, 28],
//!     "color": "#006688",
//!     "rotateWithView": false
//!   }
//! }
//! ```
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use stipple_expr::Expression;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralStyle {
    /// Features for which this evaluates to false are not drawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Expression>,
    #[serde(default)]
    pub variables: StyleVariables,
    pub symbol: LiteralSymbolStyle,
}

impl LiteralStyle {
    pub fn new(symbol: LiteralSymbolStyle) -> Self {
        Self {
            filter: None,
            variables: StyleVariables::default(),
            symbol,
        }
    }

    pub fn with_filter(mut self, filter: Expression) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_variables(mut self, variables: StyleVariables) -> Self {
        self.variables = variables;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// How each symbol is drawn. Absent expressions fall back to defaults at
/// compile time: size `1`, color `"white"`, opacity `1`, rotation `0`,
/// offset `[0, 0]`, texture rectangle `[0, 0, 1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiteralSymbolStyle {
    /// One of `square`, `circle`, `triangle` or `image`.
    pub symbol_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Expression>,
    /// Radians, clockwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Expression>,
    /// Texture rectangle as `[left, top, right, bottom]` in `0..=1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_coord: Option<Expression>,
    #[serde(default)]
    pub rotate_with_view: bool,
    /// Image source, only used by `image` symbols.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<String>,
}

impl LiteralSymbolStyle {
    pub fn new(symbol_type: impl Into<String>) -> Self {
        Self {
            symbol_type: symbol_type.into(),
            size: None,
            color: None,
            opacity: None,
            rotation: None,
            offset: None,
            texture_coord: None,
            rotate_with_view: false,
            src: None,
            cross_origin: None,
        }
    }

    pub fn with_size(mut self, size: impl Into<Expression>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<Expression>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_opacity(mut self, opacity: impl Into<Expression>) -> Self {
        self.opacity = Some(opacity.into());
        self
    }

    pub fn with_rotation(mut self, rotation: impl Into<Expression>) -> Self {
        self.rotation = Some(rotation.into());
        self
    }

    pub fn with_offset(mut self, offset: impl Into<Expression>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn with_texture_coord(mut self, texture_coord: impl Into<Expression>) -> Self {
        self.texture_coord = Some(texture_coord.into());
        self
    }

    pub fn with_rotate_with_view(mut self, rotate_with_view: bool) -> Self {
        self.rotate_with_view = rotate_with_view;
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn with_cross_origin(mut self, cross_origin: impl Into<String>) -> Self {
        self.cross_origin = Some(cross_origin.into());
        self
    }
}

/// Named values referenced by `["var", name]` expressions.
///
/// Clones share storage: a renderer keeps a clone and updates values
/// between frames, and the uniform callbacks of every style compiled from
/// the original observe the change.
#[derive(Debug, Clone, Default)]
pub struct StyleVariables {
    values: Arc<RwLock<Map<String, Value>>>,
}

impl StyleVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable, returning the previous value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.read().get(name).cloned()
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// A copy of the current values.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Map<String, Value>> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Map<String, Value>> for StyleVariables {
    fn from(values: Map<String, Value>) -> Self {
        Self {
            values: Arc::new(RwLock::new(values)),
        }
    }
}

impl Serialize for StyleVariables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.read().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StyleVariables {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(StyleVariables::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_camel_case() {
        let style: LiteralStyle = serde_json::from_value(json!({
            "filter": ["==", ["get", "kind"], "road"],
            "variables": { "limit": 3 },
            "symbol": {
                "symbolType": "image",
                "size": [16, 16],
                "textureCoord": [0, 0, 0.5, 0.5],
                "rotateWithView": true,
                "src": "icons/pin.png",
                "crossOrigin": "use-credentials"
            }
        }))
        .unwrap();
        assert!(style.filter.is_some());
        assert_eq!(style.variables.get("limit"), Some(json!(3)));
        let symbol = &style.symbol;
        assert_eq!(symbol.symbol_type, "image");
        assert_eq!(symbol.size, Some(Expression::NumberArray(vec![16.0, 16.0])));
        assert_eq!(
            symbol.texture_coord,
            Some(Expression::NumberArray(vec![0.0, 0.0, 0.5, 0.5]))
        );
        assert!(symbol.rotate_with_view);
        assert_eq!(symbol.cross_origin.as_deref(), Some("use-credentials"));
        assert_eq!(symbol.color, None);
    }

    #[test]
    fn test_minimal_style() {
        let style = LiteralStyle::from_json(r#"{"symbol": {"symbolType": "square"}}"#).unwrap();
        assert!(style.filter.is_none());
        assert!(style.variables.is_empty());
        assert!(!style.symbol.rotate_with_view);
    }

    #[test]
    fn test_rejects_bad_expression() {
        let err = LiteralStyle::from_json(r#"{"symbol": {"symbolType": "square", "size": {"a": 1}}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_variables_share_storage() {
        let variables = StyleVariables::new();
        let view = variables.clone();
        variables.set("limit", 3);
        assert_eq!(view.get("limit"), Some(json!(3)));
        assert_eq!(view.set("limit", "high"), Some(json!(3)));
        assert_eq!(variables.get("limit"), Some(json!("high")));
        assert_eq!(variables.remove("limit"), Some(json!("high")));
        assert!(!view.contains("limit"));
    }

    #[test]
    fn test_symbol_builder() {
        let symbol = LiteralSymbolStyle::new("circle")
            .with_size(8.0)
            .with_color("red")
            .with_offset(vec![1.0, 2.0]);
        assert_eq!(symbol.size, Some(Expression::Number(8.0)));
        assert_eq!(symbol.color, Some(Expression::String("red".to_string())));
        let json = serde_json::to_value(&symbol).unwrap();
        assert_eq!(
            json,
            json!({"symbolType": "circle", "size": 8.0, "color": "red", "offset": [1.0, 2.0], "rotateWithView": false})
        );
    }
}
