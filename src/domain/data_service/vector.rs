//! Textual encoding of embedding vectors

/// Encode a vector the way the data service parses vector arguments:
/// `[v1,v2,...,vn]` with no whitespace.
pub fn encode_vector(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(","))
}
