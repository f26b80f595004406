use crate::error::{ApiError, ApiResult};

/// Continuation token for resumable history reads: the last-seen
/// `(timestamp, message_id)` pair rendered as `<timestamp>:<message_id>`.
/// Rows strictly after that pair belong to the next page.
#[derive(Debug, Clone)]
pub struct Cursor {
    pub timestamp: String,
    pub message_id: i64,
}

impl Cursor {
    pub fn encode(&self) -> String {
        format!("{}:{}", self.timestamp, self.message_id)
    }

    pub fn decode(token: &str) -> ApiResult<Self> {
        let (timestamp, id) = token
            .rsplit_once(':')
            .ok_or(ApiError::Validation("malformed cursor"))?;
        if timestamp.is_empty() {
            return Err(ApiError::Validation("malformed cursor"));
        }
        let message_id = id
            .parse()
            .map_err(|_| ApiError::Validation("malformed cursor"))?;

        Ok(Self {
            timestamp: timestamp.to_owned(),
            message_id,
        })
    }
}
