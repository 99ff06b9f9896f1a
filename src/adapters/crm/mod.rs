//! CRM gateway adapters.

mod bitrix24;
mod disabled;
mod recording;

pub use bitrix24::Bitrix24Gateway;
pub use disabled::DisabledCrmGateway;
pub use recording::RecordingCrmGateway;
