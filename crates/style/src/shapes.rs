use crate::error::StyleError;
use std::fmt;
use std::str::FromStr;

/// The symbol shapes a point style can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    Square,
    Circle,
    Triangle,
    Image,
}

impl SymbolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolType::Square => "square",
            SymbolType::Circle => "circle",
            SymbolType::Triangle => "triangle",
            SymbolType::Image => "image",
        }
    }

    /// True when the shape needs the rendered size to compute its mask.
    pub fn needs_visible_size(&self) -> bool {
        matches!(self, SymbolType::Circle | SymbolType::Triangle)
    }

    /// GLSL for the alpha mask of this shape, in `0..=1`.
    ///
    /// `visible_size` is a float expression giving the symbol width in
    /// pixels; edges are feathered over a band that shrinks as it grows.
    pub fn opacity_mask(&self, visible_size: &str) -> String {
        match self {
            SymbolType::Square | SymbolType::Image => "1.0".to_string(),
            SymbolType::Circle => format!(
                "(1.0-smoothstep(1.-4./{visible_size},1.,dot(v_quadCoord-.5,v_quadCoord-.5)*4.))"
            ),
            SymbolType::Triangle => {
                let st = "(v_quadCoord*2.-1.)";
                let a = format!("(atan({st}.x,{st}.y))");
                format!(
                    "(1.0-smoothstep(.5-3./{visible_size},.5,cos(floor(.5+{a}/2.094395102)*2.094395102-{a})*length({st})))"
                )
            }
        }
    }
}

impl FromStr for SymbolType {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "square" => Ok(SymbolType::Square),
            "circle" => Ok(SymbolType::Circle),
            "triangle" => Ok(SymbolType::Triangle),
            "image" => Ok(SymbolType::Image),
            other => Err(StyleError::UnknownSymbolType(other.to_string())),
        }
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
