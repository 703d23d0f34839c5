// Common test utilities

use std::sync::Arc;

use server_core::domains::auth::JwtService;
use server_core::kernel::test_dependencies::{MemoryMemberStore, MockIdentityGateway};
use server_core::kernel::ServerDeps;
use test_context::AsyncTestContext;

/// Test harness wiring the mock collaborators into the dependency
/// container.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let deps = ctx.deps_with_gateway(MockIdentityGateway::new());
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub store: Arc<MemoryMemberStore>,
    pub jwt_service: Arc<JwtService>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryMemberStore::new()),
            jwt_service: Arc::new(JwtService::new(
                "test_secret_key",
                "test_issuer".to_string(),
            )),
        }
    }

    /// Build deps around a scripted gateway.
    #[allow(dead_code)]
    pub fn deps_with_gateway(&self, gateway: MockIdentityGateway) -> ServerDeps {
        ServerDeps::new(
            self.store.clone(),
            Arc::new(gateway),
            self.jwt_service.clone(),
        )
    }
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {}
}
