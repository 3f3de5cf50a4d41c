use serde::{Deserialize, Serialize};

/// One cache entry; callers serialize their own records into `value`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheData {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_entry_wire_shape() {
        let entry = CacheData {
            value: "{\"user_id\":\"u1\"}".to_string(),
        };

        let encoded = serde_json::to_string(&entry).unwrap();
        assert_eq!(encoded, r#"{"value":"{\"user_id\":\"u1\"}"}"#);

        let decoded: CacheData = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.value, entry.value);
    }
}
