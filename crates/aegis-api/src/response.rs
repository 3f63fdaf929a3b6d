//! The envelope every handler returns: an HTTP status a framework
//! adapter maps directly, plus the request id that propagates via
//! `X-Aegis-Request-Id` (spec §6).

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: u16,
    pub request_id: Uuid,
    pub body: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: u16, request_id: Uuid, body: T) -> Self {
        Self {
            status,
            request_id,
            body,
        }
    }

    pub fn ok(request_id: Uuid, body: T) -> Self {
        Self::new(200, request_id, body)
    }

    pub fn created(request_id: Uuid, body: T) -> Self {
        Self::new(201, request_id, body)
    }
}
