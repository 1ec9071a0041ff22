// Editor-facing commands: smart add, provider setup and bulk mention

pub mod bulk;
pub mod host;
pub mod pipeline;
pub mod setup;
