pub mod contact;
pub mod ingest;
pub mod query;

#[cfg(test)]
mod test_support;
