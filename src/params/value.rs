//! Parameter values.
//!
//! Every value is stored as text; conversions produce the canonical string
//! form at construction time so a `ParameterSet` is purely textual.

/// A single argument for a bound call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParamValue {
    /// Contributes nothing to the parameter set. Distinct from the empty string.
    #[default]
    Absent,
    Text(String),
}

impl ParamValue {
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Absent => None,
            Self::Text(s) => Some(s),
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Absent => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Text(if value { "true" } else { "false" }.to_string())
    }
}

impl From<char> for ParamValue {
    fn from(value: char) -> Self {
        Self::Text(value.to_string())
    }
}

macro_rules! impl_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Text(value.to_string())
                }
            }
        )*
    };
}

impl_from_display!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}
