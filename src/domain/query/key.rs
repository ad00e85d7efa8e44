//! Structural query keys

use std::fmt;

/// One parameter of a query key
///
/// Floats are held by bit pattern so keys can be `Eq` and `Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Text(String),
    List(Vec<KeyPart>),
}

impl KeyPart {
    pub fn float(value: f64) -> Self {
        // -0.0 and 0.0 describe the same request
        let value = if value == 0.0 { 0.0 } else { value };
        Self::Float(value.to_bits())
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for KeyPart {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for KeyPart {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for KeyPart {
    fn from(value: f64) -> Self {
        Self::float(value)
    }
}

impl From<f32> for KeyPart {
    fn from(value: f32) -> Self {
        Self::float(f64::from(value))
    }
}

impl From<&[f32]> for KeyPart {
    fn from(values: &[f32]) -> Self {
        Self::List(values.iter().copied().map(KeyPart::from).collect())
    }
}

impl<T> From<Option<T>> for KeyPart
where
    T: Into<KeyPart>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(KeyPart::Null)
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            Self::Text(s) => write!(f, "{:?}", s),
            Self::List(parts) => {
                write!(f, "[")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Ordered tuple of (capability, parameters...) identifying one cache slot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    capability: String,
    parts: Vec<KeyPart>,
}

impl QueryKey {
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            parts: Vec::new(),
        }
    }

    /// Append a parameter
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.parts.push(part.into());
        self
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.capability)?;
        for part in &self.parts {
            write!(f, ":{}", part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equal_parameters_give_equal_keys() {
        let a = QueryKey::new("content_gaps").with("blog-1").with(0.5);
        let b = QueryKey::new("content_gaps").with("blog-1").with(0.5);

        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_any_differing_parameter_gives_unequal_keys() {
        let base = QueryKey::new("keyword_recommendations")
            .with("post-1")
            .with(0.7)
            .with(10u32);

        let variants = [
            QueryKey::new("semantic_duplicates")
                .with("post-1")
                .with(0.7)
                .with(10u32),
            QueryKey::new("keyword_recommendations")
                .with("post-2")
                .with(0.7)
                .with(10u32),
            QueryKey::new("keyword_recommendations")
                .with("post-1")
                .with(0.71)
                .with(10u32),
            QueryKey::new("keyword_recommendations")
                .with("post-1")
                .with(0.7)
                .with(11u32),
        ];

        for variant in variants {
            assert_ne!(base, variant, "{} should differ from {}", variant, base);
        }
    }

    #[test]
    fn test_parameter_order_matters() {
        let a = QueryKey::new("q").with("x").with("y");
        let b = QueryKey::new("q").with("y").with("x");
        assert_ne!(a, b);
    }

    #[test]
    fn test_null_differs_from_empty_text() {
        let none: Option<&str> = None;
        let a = QueryKey::new("search").with(none);
        let b = QueryKey::new("search").with("");
        assert_ne!(a, b);
    }

    #[test]
    fn test_negative_zero_normalised() {
        assert_eq!(KeyPart::float(-0.0), KeyPart::float(0.0));
    }

    #[test]
    fn test_vector_parts() {
        let a = QueryKey::new("search").with(&[0.1f32, 0.2][..]);
        let b = QueryKey::new("search").with(&[0.1f32, 0.3][..]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let key = QueryKey::new("content_gaps").with("blog-1").with(0.5);
        assert_eq!(key.to_string(), "content_gaps:\"blog-1\":0.5");
    }
}
