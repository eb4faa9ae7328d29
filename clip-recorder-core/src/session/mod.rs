pub mod capture_session;
pub mod device_locator;
pub mod shutdown;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testing;
