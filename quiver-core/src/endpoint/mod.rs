pub mod parser;
pub mod record;

#[cfg(test)]
mod tests;

pub use parser::{identity_key, parse_descriptor, parse_descriptor_str, Descriptor};
pub use record::EndpointRecord;
