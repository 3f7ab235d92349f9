/// Authenticated request context
///
/// After the API server validates a bearer token, it inserts an
/// [`AuthContext`] into the request extensions. Handlers extract it with
/// Axum's `Extension` extractor and pass the user id on to the ownership
/// guard.
///
/// # Example
///
/// ```
/// use corkboard_shared::auth::middleware::AuthContext;
/// use uuid::Uuid;
///
/// let user_id = Uuid::new_v4();
/// let auth = AuthContext::from_jwt(user_id);
/// assert_eq!(auth.user_id, user_id);
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the authenticated caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context from validated JWT claims
    pub fn from_jwt(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_jwt() {
        let user_id = Uuid::new_v4();
        let auth = AuthContext::from_jwt(user_id);
        assert_eq!(auth.user_id, user_id);
    }
}
