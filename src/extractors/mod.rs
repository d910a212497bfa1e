mod json_text;

pub use self::json_text::{extract_json, is_valid_json, MalformedResponse};
