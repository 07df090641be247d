pub mod aws;
pub mod notifier;
pub mod object_source;
pub mod table;
