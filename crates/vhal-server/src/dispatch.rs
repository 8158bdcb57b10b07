//! Command dispatcher
//!
//! Maps each decoded [`Request`] to a [`Response`] using the HAL. The
//! dispatcher holds no state of its own and never touches the socket; the
//! server encodes and transmits whatever it returns.

use std::sync::Arc;

use tracing::{debug, warn};
use vhal_proto::{Request, Response, ResponseKind, Status};

use crate::hal::VehicleHal;

/// Routes harness commands to the HAL
#[derive(Debug, Clone)]
pub struct Dispatcher {
    hal: Arc<VehicleHal>,
}

impl Dispatcher {
    pub fn new(hal: Arc<VehicleHal>) -> Self {
        Self { hal }
    }

    /// Handle one command and build its reply
    pub async fn dispatch(&self, request: Request) -> Response {
        debug!("Dispatching {:?}", request);

        match request {
            Request::GetConfig { prop } => match self.hal.config(prop) {
                Some(cfg) => Response::new(ResponseKind::GetConfig, Status::ResultOk)
                    .with_configs(vec![cfg.clone()]),
                None => {
                    warn!("GetConfig for unknown property 0x{:08x}", prop);
                    Response::new(ResponseKind::GetConfig, Status::ErrorInvalidProperty)
                }
            },

            Request::GetConfigAll => Response::new(ResponseKind::GetConfigAll, Status::ResultOk)
                .with_configs(self.hal.list_properties().to_vec()),

            Request::GetProperty { prop, area_id } => {
                match self.hal.get(prop, area_id.unwrap_or(0)) {
                    Ok(value) => Response::new(ResponseKind::GetProperty, Status::ResultOk)
                        .with_values(vec![value]),
                    Err(e) => Response::new(ResponseKind::GetProperty, e.status()),
                }
            }

            Request::GetPropertyAll => Response::new(ResponseKind::GetPropertyAll, Status::ResultOk)
                .with_values(self.hal.snapshot()),

            Request::SetProperty(value) => match self.hal.apply_remote(&value).await {
                Ok(_) => Response::new(ResponseKind::SetProperty, Status::ResultOk),
                Err(e) => {
                    warn!("SetProperty rejected: {}", e);
                    Response::new(ResponseKind::SetProperty, e.status())
                }
            },

            Request::Unimplemented { msg_type } => {
                warn!("Unimplemented command kind {}", msg_type);
                Response::new(ResponseKind::Unimplemented { msg_type }, Status::ErrorUnimplementedCmd)
            }
        }
    }
}
