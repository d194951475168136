//! # Capability Dispatcher
//!
//! Invokes the hook a route points at and folds the handler's outcome into the
//! router's error taxonomy.
//!
//! | Handler outcome                  | Router outcome            |
//! |----------------------------------|---------------------------|
//! | `Ok(payload)`                    | `Ok(Reply)`, payload as-is |
//! | `Validation` / `NotFound` / `Forbidden` | same kind, same message |
//! | `Unsupported` / `UnknownAction`  | `Internal` (route table and handler disagree) |
//! | `Other`                          | `Internal`, details only logged |

use crate::capability::Capability;
use crate::descriptor::ResourceDescriptor;
use crate::error::RouterError;
use crate::resource::{ResourceError, ResourceRequest};
use crate::response::Reply;
use crate::route::RouteTarget;
use tracing::{error, warn};

/// Stateless executor of capability hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityDispatcher;

impl CapabilityDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Runs `target` on the descriptor's handler.
    ///
    /// A standard capability the descriptor does not permit is a consistency
    /// bug (the route should not exist) and is reported as `Internal`, not as
    /// a user-facing 404. The check uses the capability set recorded at
    /// registration; the handler is not asked again.
    pub async fn invoke(
        &self,
        descriptor: &ResourceDescriptor,
        target: &RouteTarget,
        request: ResourceRequest,
    ) -> Result<Reply, RouterError> {
        let resource = descriptor.name();
        let handler = descriptor.handler();

        let result = match target {
            RouteTarget::Capability(capability) => {
                if !descriptor.effective_capabilities().contains(*capability) {
                    error!(
                        resource,
                        %capability,
                        "Route exists for a capability the resource does not expose"
                    );
                    return Err(RouterError::internal());
                }
                match capability {
                    Capability::Create => handler.create(request).await,
                    Capability::New => handler.new(request).await,
                    Capability::Index => handler.index(request).await,
                    Capability::Show => handler.show(request).await,
                    Capability::Update => handler.update(request).await,
                    Capability::Edit => handler.edit(request).await,
                    Capability::Delete => handler.delete(request).await,
                    Capability::Search => handler.search(request).await,
                    Capability::NewSearch => handler.new_search(request).await,
                }
            }
            RouteTarget::Custom(action) => handler.custom(action, request).await,
        };

        result
            .map(|payload| Reply {
                status: target.success_status(),
                payload,
            })
            .map_err(|e| map_resource_error(resource, target, e))
    }
}

fn map_resource_error(resource: &str, target: &RouteTarget, e: ResourceError) -> RouterError {
    match e {
        ResourceError::Validation(message) => {
            warn!(resource, %target, %message, "Validation failed");
            RouterError::Validation(message)
        }
        ResourceError::NotFound(message) => {
            warn!(resource, %target, %message, "Not found");
            RouterError::NotFound(message)
        }
        ResourceError::Forbidden(message) => {
            warn!(resource, %target, %message, "Forbidden");
            RouterError::Forbidden(message)
        }
        other @ (ResourceError::Unsupported(_) | ResourceError::UnknownAction(_)) => {
            error!(resource, %target, error = %other, "Handler does not implement routed hook");
            RouterError::internal()
        }
        ResourceError::Other(source) => {
            error!(resource, %target, error = %source, "Handler failed");
            RouterError::internal()
        }
    }
}
