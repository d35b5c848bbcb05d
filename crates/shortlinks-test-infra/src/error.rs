use thiserror::Error;

/// Failure to bring up or reach a test fixture.
///
/// Fixtures return these instead of panicking so each integration test
/// decides how loudly a missing Docker daemon should fail.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("failed to manage container: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("failed to reach Redis fixture: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type Result<T, E = TestInfraError> = std::result::Result<T, E>;
