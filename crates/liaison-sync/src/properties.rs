//! Platform property installation.

use tracing::debug;

use liaison_connector::error::ConnectorResult;
use liaison_connector::ids::ScopeToken;
use liaison_connector::mapping::FieldMapper;
use liaison_connector::traits::PlatformClient;

/// Create one platform contact property per mapped platform-side field,
/// except the built-in id. Fields without a declared type become `text`.
pub async fn install_properties(
    platform: &dyn PlatformClient,
    mapper: &FieldMapper,
    scope: &ScopeToken,
) -> ConnectorResult<()> {
    let properties = mapper.platform_properties();
    debug!(count = properties.len(), "creating platform properties");
    platform.create_properties(&properties, scope).await
}
