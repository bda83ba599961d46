use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid tracker config: {0}")]
    InvalidConfig(String),

    #[error("tracker lock poisoned by a panicking frame")]
    Poisoned,
}
