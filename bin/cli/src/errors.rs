use derive_more::Display;
use types::errors::ClientError;

#[derive(Debug, Display)]
pub enum CliError {
    #[display("{}", _0)]
    Client(ClientError),

    #[display("Invalid argument: {}", _0)]
    InvalidArgument(String),

    #[display("Interrupted")]
    Interrupted,
}

impl std::error::Error for CliError {}

impl From<ClientError> for CliError {
    fn from(error: ClientError) -> Self {
        Self::Client(error)
    }
}
