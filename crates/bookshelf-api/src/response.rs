//! The success-response envelope shared by every endpoint.

use serde::Serialize;

/// `{"success": true, "data": …, "message"?, "total"?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
  pub success: bool,
  pub data:    T,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total:   Option<usize>,
}

impl<T: Serialize> ApiResponse<T> {
  pub fn data(data: T) -> Self {
    Self { success: true, data, message: None, total: None }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn with_total(mut self, total: usize) -> Self {
    self.total = Some(total);
    self
  }
}
