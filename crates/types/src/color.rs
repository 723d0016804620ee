use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag_no_case, take_while_m_n},
    character::complete::{alpha1, char, multispace0},
    combinator::{all_consuming, map, map_opt, map_res, verify},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, preceded},
};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

fn default_one() -> f32 {
    1.0
}

fn is_one(num: &f32) -> bool {
    *num == 1.0
}

/// Errors raised while reading a color string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorParseError {
    #[error("Invalid color '{input}': {message}")]
    Invalid { input: String, message: String },
}

/// An sRGB color with 8-bit channels and a unit alpha.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(skip_serializing_if = "is_one", default = "default_one")]
    pub a: f32,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.r.hash(state);
        self.g.hash(state);
        self.b.hash(state);
        self.a.to_bits().hash(state);
    }
}

impl Default for Color {
    fn default() -> Self {
        Self { r: 0, g: 0, b: 0, a: 1.0 }
    }
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parses a CSS-like color string.
    ///
    /// Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
    /// `rgba(r, g, b, a)` and the CSS named colors (case-insensitive).
    pub fn parse(input: &str) -> Result<Color, ColorParseError> {
        match all_consuming(delimited(multispace0, color, multispace0)).parse(input) {
            Ok((_, color)) => Ok(color),
            Err(e) => Err(ColorParseError::Invalid {
                input: input.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Returns true when `input` reads as a color.
    pub fn is_color_string(input: &str) -> bool {
        Self::parse(input).is_ok()
    }

    /// The channels as `[r, g, b, a]`, with RGB in `0..=255` and alpha in `0..=1`.
    pub fn to_rgba_array(&self) -> [f64; 4] {
        [
            f64::from(self.r),
            f64::from(self.g),
            f64::from(self.b),
            // Go through the shortest decimal form so 0.3 stays 0.3 after widening.
            self.a.to_string().parse().unwrap_or(f64::from(self.a)),
        ]
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ColorDef {
            Str(String),
            Map { r: u8, g: u8, b: u8, #[serde(default = "default_one")] a: f32 },
        }

        match ColorDef::deserialize(deserializer)? {
            ColorDef::Str(s) => Color::parse(&s).map_err(de::Error::custom),
            ColorDef::Map { r, g, b, a } => Ok(Color { r, g, b, a }),
        }
    }
}

// --- Parsers ---

fn color(input: &str) -> IResult<&str, Color> {
    alt((hex_color, functional_color, named_color)).parse(input)
}

fn from_hex(input: &str) -> Result<u8, std::num::ParseIntError> {
    u8::from_str_radix(input, 16)
}

fn hex_pair(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()), from_hex).parse(input)
}

fn hex_digit(input: &str) -> IResult<&str, u8> {
    // A single digit `f` stands for `ff`.
    map_res(take_while_m_n(1, 1, |c: char| c.is_ascii_hexdigit()), |d: &str| {
        from_hex(&d.repeat(2))
    })
    .parse(input)
}

fn hex_color(input: &str) -> IResult<&str, Color> {
    preceded(
        char('#'),
        alt((
            map((hex_pair, hex_pair, hex_pair, hex_pair), |(r, g, b, a)| {
                Color::rgba(r, g, b, f32::from(a) / 255.0)
            }),
            map((hex_pair, hex_pair, hex_pair), |(r, g, b)| Color::rgb(r, g, b)),
            map((hex_digit, hex_digit, hex_digit, hex_digit), |(r, g, b, a)| {
                Color::rgba(r, g, b, f32::from(a) / 255.0)
            }),
            map((hex_digit, hex_digit, hex_digit), |(r, g, b)| Color::rgb(r, g, b)),
        )),
    )
    .parse(input)
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn functional_color(input: &str) -> IResult<&str, Color> {
    preceded(
        alt((tag_no_case("rgba"), tag_no_case("rgb"))),
        map(
            verify(
                delimited(
                    ws(char('(')),
                    separated_list1(ws(char(',')), double),
                    ws(char(')')),
                ),
                |channels: &Vec<f64>| channels.len() == 3 || channels.len() == 4,
            ),
            |channels| Color {
                r: channel(channels[0]),
                g: channel(channels[1]),
                b: channel(channels[2]),
                a: channels.get(3).map_or(1.0, |a| a.clamp(0.0, 1.0) as f32),
            },
        ),
    )
    .parse(input)
}

fn named_color(input: &str) -> IResult<&str, Color> {
    map_opt(alpha1, |name: &str| lookup_named(&name.to_ascii_lowercase())).parse(input)
}

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn lookup_named(name: &str) -> Option<Color> {
    let color = match name {
        "transparent" => Color::rgba(0, 0, 0, 0.0),
        "black" => Color::rgb(0, 0, 0),
        "silver" => Color::rgb(192, 192, 192),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "white" => Color::rgb(255, 255, 255),
        "maroon" => Color::rgb(128, 0, 0),
        "red" => Color::rgb(255, 0, 0),
        "purple" => Color::rgb(128, 0, 128),
        "fuchsia" | "magenta" => Color::rgb(255, 0, 255),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "olive" => Color::rgb(128, 128, 0),
        "yellow" => Color::rgb(255, 255, 0),
        "navy" => Color::rgb(0, 0, 128),
        "blue" => Color::rgb(0, 0, 255),
        "teal" => Color::rgb(0, 128, 128),
        "aqua" | "cyan" => Color::rgb(0, 255, 255),
        "orange" => Color::rgb(255, 165, 0),
        "pink" => Color::rgb(255, 192, 203),
        "brown" => Color::rgb(165, 42, 42),
        "gold" => Color::rgb(255, 215, 0),
        "indigo" => Color::rgb(75, 0, 130),
        "violet" => Color::rgb(238, 130, 238),
        "coral" => Color::rgb(255, 127, 80),
        "crimson" => Color::rgb(220, 20, 60),
        "salmon" => Color::rgb(250, 128, 114),
        "tomato" => Color::rgb(255, 99, 71),
        "khaki" => Color::rgb(240, 230, 140),
        "beige" => Color::rgb(245, 245, 220),
        "ivory" => Color::rgb(255, 255, 240),
        "lavender" => Color::rgb(230, 230, 250),
        "turquoise" => Color::rgb(64, 224, 208),
        "tan" => Color::rgb(210, 180, 140),
        "chocolate" => Color::rgb(210, 105, 30),
        "orchid" => Color::rgb(218, 112, 214),
        "plum" => Color::rgb(221, 160, 221),
        "skyblue" => Color::rgb(135, 206, 235),
        "steelblue" => Color::rgb(70, 130, 180),
        "royalblue" => Color::rgb(65, 105, 225),
        "darkblue" => Color::rgb(0, 0, 139),
        "darkred" => Color::rgb(139, 0, 0),
        "darkgreen" => Color::rgb(0, 100, 0),
        "darkgray" | "darkgrey" => Color::rgb(169, 169, 169),
        "lightgray" | "lightgrey" => Color::rgb(211, 211, 211),
        "lightblue" => Color::rgb(173, 216, 230),
        "lightgreen" => Color::rgb(144, 238, 144),
        "forestgreen" => Color::rgb(34, 139, 34),
        "seagreen" => Color::rgb(46, 139, 87),
        "slategray" | "slategrey" => Color::rgb(112, 128, 144),
        "whitesmoke" => Color::rgb(245, 245, 245),
        _ => return None,
    };
    Some(color)
}
