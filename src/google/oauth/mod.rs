pub mod endpoints;

use oauth2::EndpointNotSet;
use oauth2::EndpointSet;
use oauth2::basic::BasicClient;

/// Token-endpoint-only client; consent URLs are built by hand so they stay deterministic.
pub(crate) type GoogleTokenClient =
    BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
