pub mod import;
pub mod extraction;
pub mod tutor;
