//! Provisioning and teardown of the inventory stack.
//!
//! [`deploy::deploy`] and [`teardown::teardown`] drive any [`control_plane::ControlPlane`];
//! the binary wires them to [`aws::AwsControlPlane`].

pub mod aws;
pub mod config;
pub mod control_plane;
pub mod deploy;
pub mod error;
pub mod packager;
pub mod site;
pub mod teardown;
