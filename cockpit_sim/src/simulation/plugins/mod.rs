pub mod panel;
pub mod pose_source;
