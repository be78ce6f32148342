pub mod banfile;
pub mod wait_utils;
