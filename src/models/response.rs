use serde::Serialize;

/// Success envelope shared by every JSON endpoint. Failures are rendered by
/// `AppError` with the same `success`/`error` shape.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ActionResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}

impl ActionResponse<()> {
    pub fn done() -> Self {
        Self {
            success: true,
            data: None,
        }
    }
}
